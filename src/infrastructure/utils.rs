pub mod email_html;
pub mod get_client_ip;
pub mod multipart;
pub mod sse;
pub mod tags;
pub mod valid_uuid;
