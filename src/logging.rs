use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;

pub fn setup(verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();

    if verbosity.is_present() {
        let directive =
            tracing_subscriber::filter::Directive::from(verbosity.tracing_level_filter());
        env_filter = env_filter.add_directive(directive);
    }

    let subscriber = tracing_subscriber::registry::Registry::default().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(env_filter),
    );

    tracing::subscriber::set_global_default(subscriber).expect("Setting up logger works");
}
