//! `events`: stream push notifications until Ctrl-C (or `--count`).

use std::sync::Arc;

use tokio::sync::mpsc;

use bambou::{Event, PushCenter};

use super::VsdSession;
use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: Arc<VsdSession>,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut push = PushCenter::new(session);

    if args.entity_type.is_empty() {
        push.register_default_handler(move |event| {
            let _ = tx.send(event.clone());
        });
    } else {
        for entity_type in &args.entity_type {
            let tx = tx.clone();
            push.register_handler(entity_type.clone(), move |event| {
                let _ = tx.send(event.clone());
            });
        }
        drop(tx);
    }

    push.start();
    tracing::info!("listening for events, press Ctrl-C to stop");

    let mut seen = 0_usize;
    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => break signal.map_err(CliError::from),
            event = rx.recv() => {
                let Some(event) = event else { break Ok(()) };

                match output::render_single(global.format(), &event, |e| format!("{} {}", e.event_type, e.entity_type)) {
                    Ok(out) => output::print_output(&out, global.quiet),
                    Err(e) => break Err(e),
                }

                seen += 1;
                if args.count.is_some_and(|max| seen >= max) {
                    break Ok(());
                }
            }
        }
    };

    push.stop().await;
    result
}
