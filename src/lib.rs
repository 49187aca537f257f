pub mod error;
pub mod goal;
pub mod policy;
pub mod rng;
pub mod sampler;

#[cfg(feature = "core")]
pub mod distribution;
#[cfg(feature = "core")]
pub mod game;

#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod store;

/// a probability in [0, 1]
pub type Probability = f64;
/// an n-attribute bitmask; bit i set iff attribute i is present
pub type Attrs = u32;

pub const ACCEPTED_LIMIT: u32 = 1000;
pub const LOSS_LIMIT: u32 = 20_000 + ACCEPTED_LIMIT;
pub const MAX_ATTRS: usize = 32;

/// initialize logging, matching the server and client binaries' startup sequence
#[cfg(any(feature = "server", feature = "client"))]
pub fn init_logging() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    match std::fs::create_dir_all("logs").and_then(|_| {
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time moves slow")
            .as_secs();
        std::fs::File::create(format!("logs/{}.log", time))
    }) {
        Ok(file) => {
            let write = simplelog::WriteLogger::new(log::LevelFilter::Debug, config, file);
            simplelog::CombinedLogger::init(vec![term, write]).expect("initialize logger");
        }
        Err(_) => {
            simplelog::CombinedLogger::init(vec![term]).expect("initialize logger");
        }
    }
}
