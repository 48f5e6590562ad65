//! Development server with live reload
//!
//! Serves the public directory the way a static host would, honoring the
//! configured `root` prefix so a site destined for `example.com/blog/`
//! previews at `localhost:4000/blog/`. When watching is enabled, every
//! rebuild pushes a reload to connected browsers over a WebSocket.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::Vellum;

/// Script injected before `</body>` on every served HTML page
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function () {
  var ws = new WebSocket("ws://" + location.host + "/__livereload");
  ws.onmessage = function (msg) {
    if (msg.data === "reload") location.reload();
  };
  ws.onclose = function () {
    console.log("Live reload lost; retrying in 1s");
    setTimeout(function () { location.reload(); }, 1000);
  };
})();
</script>
</body>
"#;

struct ServerState {
    public_dir: PathBuf,
    root: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(vellum: &Vellum, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: vellum.public_dir.clone(),
        root: vellum.config.root.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .with_state(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, vellum.config.root);
    println!("Serving {} at {}", vellum.public_dir.display(), url);
    if watch {
        println!("Watching for changes; pages reload automatically.");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let vellum = vellum.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_and_reload(vellum, reload_tx).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild on source changes and notify connected clients
async fn watch_and_reload(vellum: Vellum, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Editors fire several events per save; collapse them
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&vellum.content_dir, &vellum.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = vellum.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .map(|e| e.path.as_path())
                    .filter(|p| is_relevant(p))
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for path in &changed {
                    println!("Changed: {}", path.display());
                }

                // Config edits only take effect through a fresh Vellum
                match Vellum::new(&vellum.base_dir).and_then(|v| v.build()) {
                    Ok(_) => {
                        println!("Rebuilt; reloading browsers.");
                        let _ = reload_tx.send(());
                    }
                    Err(e) => {
                        println!("Build failed: {}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Filter out editor droppings and VCS noise
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains("node_modules")
        && !path_str.ends_with('~')
}

async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve a file from the public directory, injecting the reload script
/// into HTML pages when live reload is on
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let request = strip_root(request, &state.root);
    let file_path = resolve(&state.public_dir, request.uri().path());

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        // Everything else (assets, feeds, and HTML with reload off) goes
        // through ServeDir for content types and range handling
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Remove the configured site root from the request path, so links emitted
/// for the deployed location resolve during local preview.
fn strip_root(mut request: Request<Body>, root: &str) -> Request<Body> {
    let prefix = root.trim_end_matches('/');
    if prefix.is_empty() {
        return request;
    }

    let stripped = match request.uri().path().strip_prefix(prefix) {
        Some("") => "/".to_string(),
        // "/blogfoo" is not under "/blog/"
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => return request,
    };

    let path_and_query = match request.uri().query() {
        Some(q) => format!("{}?{}", stripped, q),
        None => stripped,
    };
    if let Ok(uri) = path_and_query.parse::<Uri>() {
        *request.uri_mut() = uri;
    }

    request
}

/// Map a request path to a file under the public directory.
///
/// Directories resolve to their `index.html`; extensionless paths fall back
/// to `<path>.html` so pretty URLs keep working without a rewrite layer.
fn resolve(public_dir: &Path, request_path: &str) -> PathBuf {
    if request_path == "/" {
        return public_dir.join("index.html");
    }

    let clean = request_path.trim_start_matches('/');
    let candidate = public_dir.join(clean);

    if candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.exists() {
        candidate
    } else {
        let with_html = public_dir.join(format!("{}.html", clean));
        if with_html.exists() {
            with_html
        } else {
            candidate
        }
    }
}

fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_inject_live_reload_replaces_body_close() {
        let html = "<html><body><p>hi</p></body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("__livereload"));
        assert_eq!(injected.matches("</body>").count(), 1);
    }

    #[test]
    fn test_inject_live_reload_appends_when_no_body() {
        let injected = inject_live_reload("<p>fragment</p>");
        assert!(injected.starts_with("<p>fragment</p>"));
        assert!(injected.contains("__livereload"));
    }

    #[test]
    fn test_resolve_paths() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "home").unwrap();
        fs::create_dir_all(tmp.path().join("articles/a")).unwrap();
        fs::write(tmp.path().join("articles/a/index.html"), "a").unwrap();
        fs::write(tmp.path().join("about.html"), "about").unwrap();

        assert_eq!(resolve(tmp.path(), "/"), tmp.path().join("index.html"));
        assert_eq!(
            resolve(tmp.path(), "/articles/a/"),
            tmp.path().join("articles/a/index.html")
        );
        // Extensionless request finds the .html file
        assert_eq!(resolve(tmp.path(), "/about"), tmp.path().join("about.html"));
        // Unknown paths resolve to the missing candidate, not a panic
        assert_eq!(resolve(tmp.path(), "/nope"), tmp.path().join("nope"));
    }

    #[test]
    fn test_strip_root_prefix() {
        let req = Request::builder()
            .uri("/blog/articles/x/")
            .body(Body::empty())
            .unwrap();
        let req = strip_root(req, "/blog/");
        assert_eq!(req.uri().path(), "/articles/x/");

        // The bare prefix maps to the site root
        let req = Request::builder()
            .uri("/blog")
            .body(Body::empty())
            .unwrap();
        let req = strip_root(req, "/blog/");
        assert_eq!(req.uri().path(), "/");

        // Default root leaves paths alone
        let req = Request::builder()
            .uri("/articles/x/")
            .body(Body::empty())
            .unwrap();
        let req = strip_root(req, "/");
        assert_eq!(req.uri().path(), "/articles/x/");

        // A path that merely shares the prefix text is untouched
        let req = Request::builder()
            .uri("/blogfoo")
            .body(Body::empty())
            .unwrap();
        let req = strip_root(req, "/blog/");
        assert_eq!(req.uri().path(), "/blogfoo");
    }

    #[test]
    fn test_is_relevant_filters_noise() {
        assert!(is_relevant(Path::new("content/post.md")));
        assert!(!is_relevant(Path::new(".git/HEAD")));
        assert!(!is_relevant(Path::new("content/post.md~")));
        assert!(!is_relevant(Path::new("static/.DS_Store")));
    }
}
