// Tracing subscriber setup; filter comes from RUST_LOG

use tracing_subscriber::{fmt, EnvFilter};

// Safe to call more than once: later calls keep the first subscriber
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
        tracing::info!("Tracing initialised");
    }
}
