use crate::config::ConfigView;
use crate::server::auth::TokenValidator;
use axum::extract::FromRef;
use fxhash::FxHashMap;
use scaffold_domain::config::ApiConfig;
use scaffold_domain::environment::HostEnvironment;
use scaffold_domain::registry::FeatureModuleInfo;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

#[scaffold_derive::scaffold_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing service{}: {message}", format_context(.context))]
    MissingService { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Type-keyed container of services registered by feature modules.
#[derive(Default, Clone)]
pub struct ServiceMap {
    services: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceMap {
    /// Registers `service`, returning `true` if it replaced one of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) -> bool {
        self.services.insert(TypeId::of::<T>(), Arc::new(service)).is_some()
    }

    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMap").field("len", &self.services.len()).finish()
    }
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub config_view: Arc<ConfigView>,
    pub environment: HostEnvironment,
    pub modules: Arc<[FeatureModuleInfo]>,
    pub tokens: TokenValidator,
    services: ServiceMap,
}

/// Immutable application snapshot handed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn service<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.services.get::<T>()
    }

    /// Returns the service if a module registered it.
    ///
    /// # Errors
    /// Returns an error if no service of type `T` is registered.
    pub fn try_service<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ApiStateError> {
        self.service::<T>().ok_or_else(|| ApiStateError::MissingService {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for HostEnvironment {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.environment.clone()
    }
}

impl FromRef<ApiState> for TokenValidator {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.tokens.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    config_view: Option<ConfigView>,
    environment: Option<HostEnvironment>,
    modules: Vec<FeatureModuleInfo>,
    services: ServiceMap,
}

impl ApiStateBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_view(mut self, view: ConfigView) -> Self {
        self.config_view = Some(view);
        self
    }

    pub fn environment(mut self, environment: HostEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Descriptors of the registered modules, in registration order.
    pub fn modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = FeatureModuleInfo>,
    {
        self.modules.extend(modules);
        self
    }

    /// Services collected while registering feature modules.
    pub fn services(mut self, services: ServiceMap) -> Self {
        self.services = services;
        self
    }

    /// # Errors
    /// Returns an error if no [`ApiConfig`] was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let tokens = TokenValidator::from_config(&config.identity.jwt);

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                tokens,
                config,
                config_view: Arc::new(self.config_view.unwrap_or_default()),
                environment: self.environment.unwrap_or_default(),
                modules: self.modules.into(),
                services: self.services,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Clock(u64);

    #[test]
    fn service_map_resolves_by_type() {
        let mut services = ServiceMap::default();
        assert!(!services.insert(Clock(1)));
        assert!(services.insert(Clock(2)));

        assert_eq!(services.len(), 1);
        assert_eq!(services.get::<Clock>().as_deref(), Some(&Clock(2)));
        assert!(services.get::<String>().is_none());
    }

    #[test]
    fn build_requires_config() {
        let err = ApiState::builder().build().expect_err("config missing");
        assert!(matches!(err, ApiStateError::Validation { .. }));
    }

    #[test]
    fn state_exposes_modules_and_services() {
        let mut services = ServiceMap::default();
        services.insert(Clock(7));

        let state = ApiState::builder()
            .config(ApiConfig::default())
            .modules([FeatureModuleInfo::new("scaffold-info", "0.1.0")])
            .services(services)
            .build()
            .expect("state");

        assert_eq!(state.modules.len(), 1);
        assert_eq!(state.environment, HostEnvironment::default());
        assert!(state.config_view.is_empty());
        assert_eq!(state.try_service::<Clock>().expect("clock").0, 7);
        assert!(matches!(state.try_service::<String>(), Err(ApiStateError::MissingService { .. })));
    }
}
