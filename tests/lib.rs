mod egrep;
mod exhaustive;
mod fixture;

/// Lets `RUST_LOG` control logging in tests.
fn init() {
    let _ = env_logger::try_init();
}
