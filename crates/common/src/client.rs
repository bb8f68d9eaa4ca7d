/// A connection to an external service, built once from environment
/// variables and shared by cloning.
#[async_trait::async_trait]
pub trait ModuleClient: Clone + Send + Sync + Sized + 'static {
    const NAME: &'static str;
    const REQUIRED_ENV: &'static [&'static str];
    type Client: Send + Sync;

    /// Required variables that are not set.
    fn missing_env() -> Vec<&'static str> {
        Self::REQUIRED_ENV.iter()
            .copied()
            .filter(|var| std::env::var(var).is_err())
            .collect()
    }

    async fn connect() -> anyhow::Result<Self>;

    fn client(&self) -> &Self::Client;
}

/// Declares a [`ModuleClient`] whose `setup` block evaluates to an
/// `anyhow::Result` of the client.
#[macro_export]
macro_rules! define_module_client {
    {
        (struct $struct_name:ident, $client_name:expr)
        client_type: $client_type:ty,
        env: [ $( $env_var:literal ),* $(,)? ],
        setup: $setup_logic:expr
    } => {
        #[derive(Clone)]
        pub struct $struct_name {
            client: std::sync::Arc<$client_type>,
        }

        #[$crate::async_trait::async_trait]
        impl $crate::ModuleClient for $struct_name {
            const NAME: &'static str = $client_name;
            const REQUIRED_ENV: &'static [&'static str] = &[ $( $env_var ),* ];
            type Client = $client_type;

            async fn connect() -> $crate::anyhow::Result<Self> {
                let missing = <Self as $crate::ModuleClient>::missing_env();
                if !missing.is_empty() {
                    $crate::tracing::error!("[{}::connect] missing environment variables: [{}]", stringify!($struct_name), missing.join(", "));
                    $crate::anyhow::bail!("{} client needs {}", $client_name, missing.join(", "));
                }

                let client: $crate::anyhow::Result<$client_type> = $setup_logic.await;
                Ok(Self { client: std::sync::Arc::new(client?) })
            }

            fn client(&self) -> &Self::Client {
                &self.client
            }
        }
    }
}
