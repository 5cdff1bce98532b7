use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// A trait that defines the request metadata for a relay endpoint.
///
/// The relay answers with a plain-text confirmation, so only the success
/// and failure messages are part of the contract.
pub trait ApiRequest: Serialize + DeserializeOwned {
    /// The URL path.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Body returned with status 200.
    const SUCCESS_MESSAGE: &'static str;
    /// Body returned with status 500.
    const FAILURE_MESSAGE: &'static str;
}

// =========================================================
// Request Definitions
// =========================================================

/// Send an e-mail alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAlert {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl ApiRequest for EmailAlert {
    const PATH: &'static str = "/enviar-correo";
    const METHOD: HttpMethod = HttpMethod::Post;
    const SUCCESS_MESSAGE: &'static str = "Correo enviado";
    const FAILURE_MESSAGE: &'static str = "Error enviando correo";
}

/// Send an SMS alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsAlert {
    pub to: String,
    pub body: String,
}

impl ApiRequest for SmsAlert {
    const PATH: &'static str = "/enviar-sms";
    const METHOD: HttpMethod = HttpMethod::Post;
    const SUCCESS_MESSAGE: &'static str = "SMS enviado";
    const FAILURE_MESSAGE: &'static str = "Error enviando SMS";
}

impl EmailAlert {
    /// Sample alert used by the "send test" button of the alerts view.
    pub fn sample(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: "⚠️ Alerta de prueba".to_string(),
            text: "Este es un correo de prueba enviado desde el sistema de alertas.".to_string(),
        }
    }
}

impl SmsAlert {
    pub fn sample(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: "Este es un SMS de prueba desde el sistema de alertas.".to_string(),
        }
    }
}
