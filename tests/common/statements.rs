//! Counts SQL statements as the driver executes them
//!
//! sqlx emits one `sqlx::query` event for every statement it runs, from
//! whichever thread drives the connection. The counter is process-wide, so
//! tests that measure it hold [`serial`] for their whole body.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const SQLX_QUERY_TARGET: &str = "sqlx::query";

static EXECUTED: AtomicUsize = AtomicUsize::new(0);
static INSTALL: Once = Once::new();
static SERIAL: Mutex<()> = Mutex::const_new(());

struct CountQueries;

impl<S: Subscriber> Layer<S> for CountQueries {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() == SQLX_QUERY_TARGET {
            EXECUTED.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Installs the counting subscriber and waits for exclusive use of it
pub async fn serial() -> MutexGuard<'static, ()> {
    INSTALL.call_once(|| {
        tracing::subscriber::set_global_default(tracing_subscriber::registry().with(CountQueries))
            .expect("Failed to install statement counter");
    });
    SERIAL.lock().await
}

/// Number of statements executed while `f` runs
///
/// The last statement of `f` should be read to completion (`fetch_all` or
/// `execute`): sqlx reports a statement once its row stream is finished.
pub async fn count<F: Future>(f: F) -> (usize, F::Output) {
    let before = EXECUTED.load(Ordering::SeqCst);
    let output = f.await;
    (EXECUTED.load(Ordering::SeqCst) - before, output)
}
