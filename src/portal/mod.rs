//! The clinic portal's route declaration.
//!
//! Every private page requires an authenticated session; role sets below
//! decide who may see each page once signed in.

pub mod handlers;
pub mod loaders;

use std::sync::Arc;

use crate::providers::Directory;
use crate::routing::RouteDecl;
use crate::session::SessionStore;

pub const ADMIN: &str = "Administrador";
pub const CHIEF: &str = "Jefe Médico";
pub const DOCTOR: &str = "Doctor";
pub const PATIENT: &str = "Paciente";

/// Collaborators the declaration binds loaders and handlers to.
#[derive(Clone)]
pub struct PortalDeps {
    pub directory: Arc<dyn Directory>,
    pub sessions: SessionStore,
    pub home_location: String,
}

fn private(path: &str, title: &str) -> RouteDecl {
    RouteDecl::new(path, title).requires_authentication(true)
}

/// The static route table.
pub fn declaration(deps: &PortalDeps) -> Vec<RouteDecl> {
    let permissions = || loaders::permissions(deps.directory.clone());

    vec![
        RouteDecl::new("/home", "Inicio")
            .icon("home")
            .view("pages/public/home.html"),
        RouteDecl::new("/logout", "Cerrar sesión")
            .icon("logout")
            .handler(Arc::new(handlers::LogoutHandler::new(
                deps.sessions.clone(),
                deps.home_location.clone(),
            ))),
        private("/dashboard", "Dashboard privado")
            .icon("dashboard")
            .view("pages/private/dashboard.html")
            .loader(loaders::dashboard()),
        private("/users", "Lista de usuarios")
            .icon("users")
            .roles([ADMIN, PATIENT])
            .view("pages/private/users.html")
            .sub_route(
                private("/users/admin", "Administradores")
                    .roles([ADMIN, PATIENT])
                    .view("pages/private/users/admin.html"),
            )
            .sub_route(
                private("/users/chiefMedical", "Jefes Médicos")
                    .roles([ADMIN])
                    .view("pages/private/users/chief_medical.html"),
            )
            .sub_route(
                private("/users/doctor", "Médicos")
                    .roles([CHIEF])
                    .view("pages/private/users/doctor.html"),
            )
            .sub_route(
                private("/users/patient", "Pacientes")
                    .roles([DOCTOR])
                    .view("pages/private/users/patient.html"),
            ),
        private("/schedule", "Horarios de Atención")
            .roles([DOCTOR, CHIEF])
            .view("pages/private/schedule.html")
            .loader(permissions()),
        private("/disponibility", "Disponibilidad")
            .roles([DOCTOR])
            .view("pages/private/disponibility.html")
            .loader(permissions()),
        private("/speciality", "Especialidad")
            .roles([DOCTOR, CHIEF, PATIENT, ADMIN])
            .view("pages/private/specialities.html")
            .loader(permissions()),
        private("/services", "Servicio")
            .roles([CHIEF])
            .view("pages/private/services.html")
            .loader(permissions()),
        private("/appointment", "Citas Médicas")
            .roles([PATIENT, DOCTOR])
            .view("pages/private/appointment.html")
            .loader(permissions()),
        private("/prodoucers", "Resultados Médicos")
            .roles([DOCTOR])
            .view("pages/private/permissions.html")
            .loader(permissions()),
        private("/historyClinic", "Historia Clínica")
            .roles([PATIENT])
            .view("pages/private/history_clinic.html")
            .loader(permissions()),
        private("/permissions", "Permisos")
            .roles([ADMIN, PATIENT])
            .view("pages/private/permissions.html")
            .loader(permissions()),
        private("/profile", "Perfil")
            .roles([ADMIN, PATIENT])
            .view("pages/private/profile.html"),
        private("/roles", "Roles")
            .roles([ADMIN, PATIENT])
            .view("pages/private/roles.html")
            .loader(loaders::roles_overview(deps.directory.clone())),
    ]
}
