//! Overlay Player - Feeds timed metadata cues to an overlay session
//!
//! Run with: cargo run --example overlay_player -- [poll_service_url]
//!
//! Each line read from stdin is treated as one timed-text cue, as a player
//! would deliver it. A few commands drive the viewer side:
//!
//! ```text
//! vote <option-id>   tap a poll option
//! buy                tap "Buy now" on the basket card
//! stats              print session counters
//! quit               stop the session
//! ```
//!
//! Try:
//!
//! ```text
//! {"type":"add_to_basket","data":{"product":{"id":"p1","description":"Shorts","imageURL":"http://x/y.jpg","price":"£36.00"}}}
//! {"type":"poll","version":"1","data":{"id":"abc"}}
//! vote abc
//! {"type":"poll","question":"Time for DRG?","options":[{"id":"abc","label":"Yes"},{"id":"def","label":"No"}]}
//! ```

use stream_overlay::{OverlayConfig, OverlaySession, ViewDescriptor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stream_overlay=debug".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(url) => OverlayConfig::with_base_url(&url)?,
        None => OverlayConfig::default(),
    };

    let (session, handle, views) = OverlaySession::connect(config)?;
    let session_task = tokio::spawn(session.run());

    let render_task = tokio::spawn(render_views(views, print_view));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => continue,
            ("quit", _) => break,
            ("buy", _) => handle.buy_now().await?,
            ("vote", option) => handle.select_option(option.trim()).await?,
            ("stats", _) => println!("{:#?}", handle.stats()),
            _ => handle.on_cue(line).await?,
        }
    }

    handle.shutdown().await?;
    session_task.await?;
    drop(handle);
    render_task.await?;

    Ok(())
}

/// Draw views until the session goes away, skipping over any backlog
async fn render_views(
    mut views: broadcast::Receiver<ViewDescriptor>,
    mut draw: impl FnMut(&ViewDescriptor),
) -> u64 {
    let mut missed_total = 0;
    loop {
        match views.recv().await {
            Ok(view) => draw(&view),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed = missed, "Renderer fell behind");
                missed_total += missed;
            }
            Err(RecvError::Closed) => return missed_total,
        }
    }
}

fn print_view(view: &ViewDescriptor) {
    match view {
        ViewDescriptor::Nothing => println!("[overlay] (hidden)"),
        ViewDescriptor::Poll(card) => {
            println!("[overlay] poll {}: {}", card.poll_id, card.question);
            for option in &card.options {
                println!("          ({}) {}", option.id, option.label);
            }
        }
        ViewDescriptor::Basket(card) => {
            println!(
                "[overlay] {} {} [{}]",
                card.description, card.price, card.call_to_action
            );
        }
    }
}
