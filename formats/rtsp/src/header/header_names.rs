pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_BASE: &str = "Content-Base";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_LOCATION: &str = "Content-Location";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const C_SEQ: &str = "CSeq";
pub const PUBLIC: &str = "Public";
pub const RANGE: &str = "Range";
pub const RTP_INFO: &str = "RTP-Info";
pub const SESSION: &str = "Session";
pub const TRANSPORT: &str = "Transport";
pub const USER_AGENT: &str = "User-Agent";
