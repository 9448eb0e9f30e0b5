use std::path::PathBuf;

use rocket::{
    Request, Response, State, get,
    http::{ContentType, Header},
    response::Responder,
};

use crate::server::HttpServerContext;

/// A playlist or segment file with the HLS content types a stock player
/// expects; the playlist additionally forbids caching because it changes
/// on every segment cut.
pub struct HlsFile {
    content_type: ContentType,
    no_store: bool,
    bytes: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for HlsFile {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let mut builder = Response::build();
        builder
            .header(self.content_type)
            .sized_body(self.bytes.len(), std::io::Cursor::new(self.bytes));
        if self.no_store {
            builder.header(Header::new("Cache-Control", "no-store"));
        }
        builder.ok()
    }
}

fn content_type_for(path: &std::path::Path) -> (ContentType, bool) {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("m3u8") => (ContentType::new("application", "vnd.apple.mpegurl"), true),
        Some("ts") => (ContentType::new("video", "mp2t"), false),
        _ => (ContentType::Binary, false),
    }
}

/// Serves the output directory. Rocket's `PathBuf` segment guard already
/// rejects path traversal, so a plain join is safe here.
#[get("/<file..>")]
pub(crate) async fn serve(ctx: &State<HttpServerContext>, file: PathBuf) -> Option<HlsFile> {
    let file = if file.as_os_str().is_empty() {
        PathBuf::from("index.m3u8")
    } else {
        file
    };
    let path = ctx.config.root.join(&file);
    let (content_type, no_store) = content_type_for(&path);
    let bytes = tokio::fs::read(&path).await.ok()?;
    Some(HlsFile {
        content_type,
        no_store,
        bytes,
    })
}
