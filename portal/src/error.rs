use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Token inválido. Contacta al administrador.")]
    InvalidCredential,

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("Error al procesar el ticket ({status}): {body}")]
    Submission { status: u16, body: String },

    #[error("Error cargando tickets: {0}")]
    Load(String),

    #[error("sesión no válida")]
    NotAuthenticated,

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
