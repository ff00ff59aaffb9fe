use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use chrono::Utc;
use guidehub_core::url::clean_url;
use guidehub_generator::template::html_escape;
use guidehub_generator::{ContentLoader, RenderMode, generate_site_with_mode};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::{net::SocketAddr, path::PathBuf};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::load_site;

const PUBLIC_DIR: &str = "public";

#[derive(Clone)]
struct AppState {
    site_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

/// A page rendered for one preview request
struct PreviewPage {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

/// Start preview server with hot reload for local development.
///
/// Every request regenerates the site from disk, so edits show up without a
/// restart. Files under `public/` are served as-is, and connected browsers
/// reload through the `/_reload` event stream whenever the site changes.
///
/// # Arguments
///
/// * `path` - Path to site directory containing site.toml
/// * `port` - Port to serve on (default: 8080)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("📚 Starting preview server...");
    println!("   Site: {}", path.display());

    let site = load_site(&path)?;
    let loader = ContentLoader::new(&site, &path);

    println!("   ✓ Loaded: {}", site.name);
    println!("   ✓ Categories: {}", site.categories.len());
    println!("   ✓ Articles: {}", loader.all_articles().len());

    // Create broadcast channel for reload events
    let (reload_tx, _) = broadcast::channel::<()>(100);

    let app = router(AppState {
        site_path: path.clone(),
        reload_tx: reload_tx.clone(),
    });

    let watcher_path = path.clone();
    let watcher_tx = reload_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, watcher_tx).await {
            tracing::error!(error = %e, "file watcher stopped");
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Pages are rendered for any path that is not a file under `public/`
fn router(state: AppState) -> Router {
    let pages = Router::new()
        .fallback(page_handler)
        .with_state(state.clone());

    Router::new()
        .route("/_reload", get(sse_handler))
        .fallback_service(ServeDir::new(state.site_path.join(PUBLIC_DIR)).fallback(pages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch for file changes and trigger reload
async fn watch_files(path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Skip editor swap files and hidden files
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                }) {
                    tracing::debug!(paths = ?event.paths, "content changed");
                    println!("   📝 File changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => yield Ok(Event::default().data("reload")),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let url = clean_url(uri.path());
    let site_path = state.site_path.clone();

    let rendered = tokio::task::spawn_blocking(move || render_page(&site_path, &url)).await;

    match rendered {
        Ok(Ok(page)) => (
            page.status,
            [(header::CONTENT_TYPE, page.content_type)],
            page.body,
        )
            .into_response(),
        Ok(Err(e)) => error_page(&e),
        Err(e) => error_page(&anyhow::Error::new(e)),
    }
}

/// Regenerate the site and pick the page served at `url`
fn render_page(site_path: &std::path::Path, url: &str) -> Result<PreviewPage> {
    let site = load_site(site_path)?;
    let loader = ContentLoader::new(&site, site_path);
    let generated = generate_site_with_mode(&site, &loader, Utc::now(), RenderMode::Preview)
        .context("Failed to generate site")?;

    let page = match generated.page_for_url(url) {
        Some(body) => PreviewPage {
            status: StatusCode::OK,
            content_type: content_type_for(url),
            body: body.to_string(),
        },
        None => PreviewPage {
            status: StatusCode::NOT_FOUND,
            content_type: "text/html; charset=utf-8",
            body: generated.not_found_page().unwrap_or("Not found").to_string(),
        },
    };

    Ok(page)
}

fn content_type_for(url: &str) -> &'static str {
    if url.ends_with(".xml") {
        "application/xml; charset=utf-8"
    } else if url.ends_with(".txt") {
        "text/plain; charset=utf-8"
    } else {
        "text/html; charset=utf-8"
    }
}

fn error_page(error: &anyhow::Error) -> Response {
    tracing::error!(error = %error, "preview render failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!(
            r#"<!DOCTYPE html>
<html><head><title>Error</title></head><body>
<h1>Preview Error</h1>
<pre>{}</pre>
<script>new EventSource('/_reload').onmessage = () => location.reload();</script>
</body></html>"#,
            html_escape(&format!("{:#}", error))
        )),
    )
        .into_response()
}
