//! Request dispatch: gate, then render.
//!
//! # Data Flow
//! ```text
//! RECEIVED
//!     → gate: must_redirect?          yes → REDIRECTED
//!     → AUTH_CHECKED
//!     → predicate: allows?            no  → DENIED
//!     → ROLE_CHECKED
//!     → handler present?              yes → DELEGATED (handler owns the response)
//!     → loader (+ directory view)     err → ERRORED
//!     → DATA_LOADED
//!     → renderer                      err → ERRORED
//!     → RENDERED
//! ```
//!
//! # Design Decisions
//! - Sub-routes run the same pipeline with their own gate and roles
//! - Caller roles are threaded through as a request-scoped value
//! - Exactly one [`Outcome`] per request, whichever stage it stops at
//! - Loader failures are caught here and never leak into the response

pub mod context;

use std::sync::Arc;

use serde_json::Value;

use crate::http::request::request_id;
use crate::providers::Directory;
use crate::render::Renderer;
use crate::routing::binding::{Binding, RouteRequest};
use crate::routing::{access, gate, RouteRegistry, Target};

pub use context::{DirectoryView, RenderContext};

/// Pipeline states a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    AuthChecked,
    RoleChecked,
    DataLoaded,
    Rendered,
    Delegated,
    Redirected,
    Denied,
    Errored,
}

/// What the pipeline produced.
pub enum Outcome {
    /// Unauthenticated caller on a protected route.
    Redirect { location: String },
    /// Caller lacks every required role.
    Forbidden,
    /// Body produced by the templating layer.
    Rendered { body: String },
    /// Response produced by a handler override.
    Delegated(axum::response::Response),
    /// Loader, provider or renderer failure.
    ServerError,
    /// Target does not name a route in this registry.
    NotFound,
}

impl Outcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Redirect { .. } => "redirected",
            Outcome::Forbidden => "denied",
            Outcome::Rendered { .. } => "rendered",
            Outcome::Delegated(_) => "delegated",
            Outcome::ServerError => "errored",
            Outcome::NotFound => "not_found",
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Redirect { location } => write!(f, "Redirect({})", location),
            Outcome::Rendered { body } => write!(f, "Rendered({} bytes)", body.len()),
            Outcome::Delegated(response) => write!(f, "Delegated({})", response.status()),
            other => f.write_str(other.label()),
        }
    }
}

/// Result of one dispatch: the outcome and the stages visited.
#[derive(Debug)]
pub struct Dispatch {
    pub outcome: Outcome,
    pub trail: Vec<Stage>,
}

impl Dispatch {
    fn new(trail: Vec<Stage>, outcome: Outcome) -> Self {
        Self { outcome, trail }
    }

    /// The terminal stage.
    pub fn stage(&self) -> Stage {
        self.trail.last().copied().unwrap_or(Stage::Received)
    }

    pub fn reached(&self, stage: Stage) -> bool {
        self.trail.contains(&stage)
    }
}

/// Runs the pipeline for routes of one registry.
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    renderer: Arc<dyn Renderer>,
    directory: Arc<dyn Directory>,
    home_location: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<RouteRegistry>,
        renderer: Arc<dyn Renderer>,
        directory: Arc<dyn Directory>,
        home_location: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            renderer,
            directory,
            home_location: home_location.into(),
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Dispatch `request` to the route at `target`.
    ///
    /// Dropping the returned future abandons any in-flight load.
    pub async fn dispatch(&self, target: Target, request: RouteRequest) -> Dispatch {
        let mut trail = vec![Stage::Received];
        let request_id = request_id(request.request.headers()).to_string();

        let Some(route) = self.registry.route(target) else {
            return Dispatch::new(trail, Outcome::NotFound);
        };

        if gate::must_redirect(&request.session, route) {
            tracing::debug!(request_id = %request_id, path = %route.path(), "Unauthenticated, redirecting");
            trail.push(Stage::Redirected);
            return Dispatch::new(
                trail,
                Outcome::Redirect {
                    location: self.home_location.clone(),
                },
            );
        }
        trail.push(Stage::AuthChecked);

        if !access::allows(&request.session.roles, route.required_roles()) {
            tracing::debug!(
                request_id = %request_id,
                path = %route.path(),
                caller_roles = %request.session.roles,
                "Access denied"
            );
            trail.push(Stage::Denied);
            return Dispatch::new(trail, Outcome::Forbidden);
        }
        trail.push(Stage::RoleChecked);

        let (view, loader) = match route.binding() {
            Binding::Handler(handler) => {
                trail.push(Stage::Delegated);
                let response = handler.handle(request).await;
                return Dispatch::new(trail, Outcome::Delegated(response));
            }
            Binding::Render { view, loader } => (view, loader),
        };

        let session = &request.session;
        let items = match loader {
            Some(loader) => match loader.load(&session.roles).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!(request_id = %request_id, path = %route.path(), error = %e, "Failed to load route data");
                    trail.push(Stage::Errored);
                    return Dispatch::new(trail, Outcome::ServerError);
                }
            },
            None => Value::Array(Vec::new()),
        };

        let directory_view = if target.is_sub_node() {
            None
        } else {
            match DirectoryView::fetch(self.directory.as_ref(), session).await {
                Ok(view) => Some(view),
                Err(e) => {
                    tracing::error!(request_id = %request_id, path = %route.path(), error = %e, "Failed to load directory data");
                    trail.push(Stage::Errored);
                    return Dispatch::new(trail, Outcome::ServerError);
                }
            }
        };
        trail.push(Stage::DataLoaded);

        let mut context = RenderContext::new(
            route.title(),
            items,
            &session.roles,
            session.authenticated,
            session.name.as_deref(),
            self.registry.navigation(),
        );
        if let Some(directory_view) = directory_view {
            context = context.with_directory_view(directory_view);
        }

        match self.renderer.render(view, &context) {
            Ok(body) => {
                trail.push(Stage::Rendered);
                Dispatch::new(trail, Outcome::Rendered { body })
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, path = %route.path(), view = %view, error = %e, "Failed to render view");
                trail.push(Stage::Errored);
                Dispatch::new(trail, Outcome::ServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        MemoryDirectory, Permission, ProviderError, ProviderResult, Role, Seed, User,
    };
    use crate::render::RenderError;
    use crate::routing::binding::{loader_fn, LoadError, RouteHandler};
    use crate::routing::{RoleSet, RouteDecl};
    use crate::session::Session;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::{IntoResponse, Response};
    use futures_util::future::{BoxFuture, FutureExt};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Renders the context as JSON and counts calls.
    #[derive(Default)]
    struct JsonRenderer {
        calls: AtomicUsize,
    }

    impl Renderer for JsonRenderer {
        fn render(&self, view: &str, context: &RenderContext<'_>) -> Result<String, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let value = json!({ "view": view, "context": context });
            serde_json::to_string(&value).map_err(|e| RenderError::Other(e.to_string()))
        }
    }

    struct DownDirectory;

    impl Directory for DownDirectory {
        fn permissions(&self) -> BoxFuture<'_, ProviderResult<Vec<Permission>>> {
            async { Err(ProviderError::Unavailable("db down".into())) }.boxed()
        }
        fn roles(&self) -> BoxFuture<'_, ProviderResult<Vec<Role>>> {
            async { Err(ProviderError::Unavailable("db down".into())) }.boxed()
        }
        fn users(&self) -> BoxFuture<'_, ProviderResult<Vec<User>>> {
            async { Err(ProviderError::Unavailable("db down".into())) }.boxed()
        }
        fn user<'a>(&'a self, _id: &'a str) -> BoxFuture<'a, ProviderResult<Option<User>>> {
            async { Err(ProviderError::Unavailable("db down".into())) }.boxed()
        }
    }

    struct Logout;

    impl RouteHandler for Logout {
        fn handle(&self, request: RouteRequest) -> BoxFuture<'static, Response> {
            let who = request.session.name.unwrap_or_else(|| "anonymous".into());
            async move { (StatusCode::SEE_OTHER, format!("bye {}", who)).into_response() }.boxed()
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        renderer: Arc<JsonRenderer>,
        loads: Arc<AtomicUsize>,
    }

    fn counting_loader(loads: &Arc<AtomicUsize>) -> Arc<dyn crate::routing::DataLoader> {
        let loads = loads.clone();
        loader_fn(move |roles: RoleSet| {
            let loads = loads.clone();
            async move {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LoadError>(json!({ "seen": roles }))
            }
        })
    }

    fn fixture_with(directory: Arc<dyn Directory>, extra: Vec<RouteDecl>) -> Fixture {
        let loads = Arc::new(AtomicUsize::new(0));
        let mut decls = vec![
            RouteDecl::new("/schedule", "Horarios de Atención")
                .roles(["Doctor", "Jefe Médico"])
                .requires_authentication(true)
                .view("schedule.html")
                .loader(counting_loader(&loads)),
            RouteDecl::new("/roles", "Roles")
                .roles(["Administrador"])
                .requires_authentication(true)
                .view("roles.html")
                .loader(counting_loader(&loads)),
            RouteDecl::new("/logout", "Salir").handler(Arc::new(Logout)),
            RouteDecl::new("/users", "Usuarios")
                .roles(["Administrador"])
                .requires_authentication(true)
                .view("users.html")
                .sub_route(
                    RouteDecl::new("/users/patient", "Pacientes")
                        .roles(["Doctor"])
                        .requires_authentication(true)
                        .view("patients.html")
                        .loader(counting_loader(&loads)),
                )
                .sub_route(RouteDecl::new("/users/open", "Abierto").view("open.html")),
            RouteDecl::new("/broken", "Roto")
                .requires_authentication(true)
                .view("broken.html")
                .loader(loader_fn(|_roles: RoleSet| async {
                    Err::<Value, _>(LoadError::Provider(ProviderError::Unavailable(
                        "connection refused".into(),
                    )))
                })),
        ];
        decls.extend(extra);

        let registry = Arc::new(RouteRegistry::build(decls).unwrap());
        let renderer = Arc::new(JsonRenderer::default());
        let dispatcher = Dispatcher::new(registry, renderer.clone(), directory, "/home");
        Fixture {
            dispatcher,
            renderer,
            loads,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(MemoryDirectory::new(Seed::builtin())), Vec::new())
    }

    fn caller(roles: &[&str]) -> Session {
        Session::authenticated("u-doctor", "Diana", roles.iter().copied().collect())
    }

    fn request(session: Session) -> RouteRequest {
        RouteRequest {
            session_id: None,
            session,
            request: Request::builder().uri("/").body(Body::empty()).unwrap(),
        }
    }

    impl Fixture {
        async fn get(&self, path: &str, session: Session) -> Dispatch {
            let target = self.dispatcher.registry().find(path).unwrap();
            self.dispatcher.dispatch(target, request(session)).await
        }
    }

    fn rendered(dispatch: &Dispatch) -> Value {
        match &dispatch.outcome {
            Outcome::Rendered { body } => serde_json::from_str(body).unwrap(),
            other => panic!("expected a rendered page, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_matching_role_reaches_loader() {
        let f = fixture();
        let dispatch = f.get("/schedule", caller(&["Doctor"])).await;

        assert!(dispatch.reached(Stage::RoleChecked));
        assert_eq!(dispatch.stage(), Stage::Rendered);
        assert_eq!(f.loads.load(Ordering::SeqCst), 1);

        let page = rendered(&dispatch);
        assert_eq!(page["view"], "schedule.html");
        assert_eq!(page["context"]["title"], "Horarios de Atención");
        assert_eq!(page["context"]["items"]["seen"], json!(["Doctor"]));
    }

    #[tokio::test]
    async fn test_missing_role_denied_without_loading() {
        let f = fixture();
        let dispatch = f.get("/schedule", caller(&["Paciente"])).await;

        assert_eq!(dispatch.trail, vec![Stage::Received, Stage::AuthChecked, Stage::Denied]);
        assert!(matches!(dispatch.outcome, Outcome::Forbidden));
        assert_eq!(f.loads.load(Ordering::SeqCst), 0);
        assert_eq!(f.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_redirected_before_role_check() {
        let f = fixture();
        let session = Session {
            authenticated: false,
            roles: ["Administrador"].into_iter().collect(),
            user_id: None,
            name: None,
        };

        for session in [session, Session::anonymous()] {
            let dispatch = f.get("/roles", session).await;
            assert_eq!(dispatch.trail, vec![Stage::Received, Stage::Redirected]);
            assert!(!dispatch.reached(Stage::RoleChecked));
            match dispatch.outcome {
                Outcome::Redirect { location } => assert_eq!(location, "/home"),
                other => panic!("expected redirect, got {:?}", other),
            }
        }
        assert_eq!(f.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_owns_response() {
        let f = fixture();

        for session in [Session::anonymous(), caller(&["Doctor"])] {
            let dispatch = f.get("/logout", session).await;
            assert_eq!(dispatch.stage(), Stage::Delegated);
            assert!(!dispatch.reached(Stage::DataLoaded));
            match dispatch.outcome {
                Outcome::Delegated(response) => assert_eq!(response.status(), StatusCode::SEE_OTHER),
                other => panic!("expected delegation, got {:?}", other),
            }
        }
        assert_eq!(f.loads.load(Ordering::SeqCst), 0);
        assert_eq!(f.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loader_failure_is_server_error() {
        let f = fixture();
        let dispatch = f.get("/broken", caller(&[])).await;

        assert_eq!(dispatch.stage(), Stage::Errored);
        assert!(!dispatch.reached(Stage::DataLoaded));
        assert!(matches!(dispatch.outcome, Outcome::ServerError));
        assert_eq!(f.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_directory_failure_only_affects_top_level() {
        let f = fixture_with(Arc::new(DownDirectory), Vec::new());

        let top = f.get("/schedule", caller(&["Doctor"])).await;
        assert!(matches!(top.outcome, Outcome::ServerError));

        let sub = f.get("/users/patient", caller(&["Doctor"])).await;
        assert_eq!(sub.stage(), Stage::Rendered);
    }

    #[tokio::test]
    async fn test_top_level_context_carries_directory_view() {
        let f = fixture();
        let page = rendered(&f.get("/schedule", caller(&["Doctor"])).await);

        assert_eq!(page["context"]["profile"]["id"], "u-doctor");
        assert_eq!(page["context"]["all_roles"].as_array().unwrap().len(), 4);
        assert_eq!(page["context"]["routes"].as_array().unwrap().len(), 5);
        assert_eq!(page["context"]["username"], "Diana");

        let sub = rendered(&f.get("/users/patient", caller(&["Doctor"])).await);
        assert!(sub["context"].get("profile").is_none());
        assert!(sub["context"].get("all_users").is_none());
    }

    #[tokio::test]
    async fn test_sub_route_gates_are_independent() {
        let f = fixture();

        // Parent requires Administrador, sub-route requires Doctor.
        let parent = f.get("/users", caller(&["Doctor"])).await;
        assert_eq!(parent.stage(), Stage::Denied);
        let sub = f.get("/users/patient", caller(&["Doctor"])).await;
        assert_eq!(sub.stage(), Stage::Rendered);

        let admin_sub = f.get("/users/patient", caller(&["Administrador"])).await;
        assert_eq!(admin_sub.stage(), Stage::Denied);

        // Public sub-route under a protected parent.
        let open = f.get("/users/open", Session::anonymous()).await;
        assert_eq!(open.stage(), Stage::Rendered);
        let parent = f.get("/users", Session::anonymous()).await;
        assert_eq!(parent.stage(), Stage::Redirected);
    }

    #[tokio::test]
    async fn test_no_loader_means_no_data() {
        let f = fixture();
        let page = rendered(&f.get("/users/open", Session::anonymous()).await);
        assert_eq!(page["context"]["items"], json!([]));
        assert_eq!(page["context"]["is_authenticated"], false);
    }

    #[tokio::test]
    async fn test_repeated_dispatch_is_idempotent() {
        let f = fixture();
        let first = rendered(&f.get("/schedule", caller(&["Jefe Médico"])).await);
        let second = rendered(&f.get("/schedule", caller(&["Jefe Médico"])).await);
        assert_eq!(first, second);
        assert_eq!(f.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_see_only_their_roles() {
        let slow = RouteDecl::new("/slow", "Lento")
            .requires_authentication(true)
            .view("slow.html")
            .loader(loader_fn(|roles: RoleSet| async move {
                // The first caller is held back until the second has finished.
                let delay = if roles.contains("Doctor") { 50 } else { 0 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, LoadError>(json!({ "seen": roles }))
            }));
        let f = fixture_with(Arc::new(MemoryDirectory::new(Seed::builtin())), vec![slow]);

        let (doctor, patient) = tokio::join!(
            f.get("/slow", caller(&["Doctor"])),
            f.get("/slow", caller(&["Paciente"])),
        );
        let doctor = rendered(&doctor);
        let patient = rendered(&patient);

        assert_eq!(doctor["context"]["caller_roles"], json!(["Doctor"]));
        assert_eq!(doctor["context"]["items"]["seen"], json!(["Doctor"]));
        assert_eq!(patient["context"]["caller_roles"], json!(["Paciente"]));
        assert_eq!(patient["context"]["items"]["seen"], json!(["Paciente"]));
    }

    #[tokio::test]
    async fn test_unknown_target_not_found() {
        let f = fixture();
        let dispatch = f.dispatcher.dispatch(Target::Node(99), request(Session::anonymous())).await;
        assert!(matches!(dispatch.outcome, Outcome::NotFound));
    }
}
