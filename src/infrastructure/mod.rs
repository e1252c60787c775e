pub mod http_transport;

#[cfg(test)]
pub(crate) mod fake_transport;

pub use http_transport::{HttpResponse, HttpTransport, ReqwestTransport};
