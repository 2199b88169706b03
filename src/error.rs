#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Setting up error reporting failed")]
    InstallingColorEyre(#[source] color_eyre::Report),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("GPIO register block at '{path}' is unavailable")]
    GpioUnavailable {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("SPI device '{path}' is unavailable")]
    SpiUnavailable {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("SPI device '{path}' rejected its configuration")]
    SpiConfigRejected {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("SPI transfer failed")]
    SpiTransfer(#[source] std::io::Error),

    #[error("Reading the realtime clock failed")]
    Clock(#[source] nix::errno::Errno),

    #[error("Sleeping until the next second boundary failed")]
    ClockSleep(#[source] nix::errno::Errno),

    #[error("Initializing the LED strip failed")]
    StripInit(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Rendering to the LED strip failed")]
    StripRender(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to install signal handlers")]
    Signals(#[source] std::io::Error),

    #[error("Failed to spawn the '{name}' worker thread")]
    SpawnWorker {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("The '{0}' worker thread panicked")]
    WorkerPanicked(&'static str),
}
