//! Feature module contract and startup registry.

use crate::server::routes::RouteTable;
use crate::server::state::ServiceMap;
use scaffold_domain::config::ApiConfig;
use scaffold_domain::environment::HostEnvironment;
use scaffold_domain::registry::FeatureModuleInfo;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[scaffold_derive::scaffold_error]
pub enum ModuleError {
    #[error("Feature module '{name}' is registered twice")]
    Duplicate { name: Cow<'static, str> },
    #[error("Feature module '{module}' failed to register{}: {message}", format_context(.context))]
    Registration {
        module: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

impl ModuleError {
    pub fn registration(
        module: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Registration { module: module.into(), message: message.into(), context: None }
    }
}

/// A self-contained unit that registers services and contributes endpoints.
pub trait FeatureModule: Send + Sync + 'static {
    fn info(&self) -> FeatureModuleInfo;

    /// Registers services. Called exactly once, before any endpoint is mapped.
    ///
    /// # Errors
    /// Any error aborts startup.
    fn register(&self, context: &mut ModuleContext) -> Result<(), ModuleError> {
        let _ = context;
        Ok(())
    }

    /// Adds the module's endpoints to the route table.
    fn map_endpoints(&self, routes: RouteTable) -> RouteTable {
        routes
    }
}

/// What a module sees while registering.
#[derive(Debug)]
pub struct ModuleContext {
    config: ApiConfig,
    environment: HostEnvironment,
    services: ServiceMap,
}

impl ModuleContext {
    #[must_use]
    pub fn new(config: ApiConfig, environment: HostEnvironment) -> Self {
        Self { config, environment, services: ServiceMap::default() }
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub const fn environment(&self) -> &HostEnvironment {
        &self.environment
    }

    #[must_use]
    pub const fn services(&self) -> &ServiceMap {
        &self.services
    }

    pub const fn services_mut(&mut self) -> &mut ServiceMap {
        &mut self.services
    }

    /// Services registered so far, ready for the application state.
    #[must_use]
    pub fn into_services(self) -> ServiceMap {
        self.services
    }
}

/// Startup list of feature modules, in the order they were added.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn FeatureModule>>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns [`ModuleError::Duplicate`] if a module with the same name is present.
    pub fn add(&mut self, module: Arc<dyn FeatureModule>) -> Result<&mut Self, ModuleError> {
        let name = module.info().name;
        if self.modules.iter().any(|existing| existing.info().name == name) {
            return Err(ModuleError::Duplicate { name });
        }
        self.modules.push(module);
        Ok(self)
    }

    /// # Errors
    /// Returns [`ModuleError::Duplicate`] on the first repeated name.
    pub fn from_modules<I>(modules: I) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = Arc<dyn FeatureModule>>,
    {
        let mut registry = Self::new();
        for module in modules {
            registry.add(module)?;
        }
        Ok(registry)
    }

    #[must_use]
    pub fn infos(&self) -> Vec<FeatureModuleInfo> {
        self.modules.iter().map(|module| module.info()).collect()
    }

    /// Runs every module's `register` once, in order.
    ///
    /// # Errors
    /// Stops at the first module that fails.
    pub fn register(self, context: &mut ModuleContext) -> Result<RegisteredModules, ModuleError> {
        for module in &self.modules {
            let info = module.info();
            module.register(context)?;
            info!(module = %info.name, version = %info.version, "Feature module registered");
        }
        Ok(RegisteredModules { modules: self.modules })
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.iter().map(|module| module.info().name)).finish()
    }
}

/// Modules whose registration succeeded; only these can map endpoints.
pub struct RegisteredModules {
    modules: Vec<Arc<dyn FeatureModule>>,
}

impl RegisteredModules {
    #[must_use]
    pub fn infos(&self) -> Vec<FeatureModuleInfo> {
        self.modules.iter().map(|module| module.info()).collect()
    }

    /// Lets each module add its endpoints, in registration order.
    pub fn map_endpoints(&self, routes: RouteTable) -> RouteTable {
        self.modules.iter().fold(routes, |routes, module| module.map_endpoints(routes))
    }
}

impl fmt::Debug for RegisteredModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.iter().map(|module| module.info().name)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        calls: AtomicUsize,
        fail: bool,
    }

    impl Counting {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, calls: AtomicUsize::new(0), fail: false })
        }
    }

    impl FeatureModule for Counting {
        fn info(&self) -> FeatureModuleInfo {
            FeatureModuleInfo::new(self.name, "1.0.0")
        }

        fn register(&self, context: &mut ModuleContext) -> Result<(), ModuleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ModuleError::registration(self.name, "refused"));
            }
            context.services_mut().insert(self.name.to_owned());
            Ok(())
        }
    }

    fn context() -> ModuleContext {
        ModuleContext::new(ApiConfig::default(), HostEnvironment::default())
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ModuleRegistry::from_modules([
            Counting::new("a") as Arc<dyn FeatureModule>,
            Counting::new("b"),
            Counting::new("a"),
        ])
        .expect_err("duplicate");
        assert!(matches!(err, ModuleError::Duplicate { name } if name == "a"));
    }

    #[test]
    fn register_runs_once_per_module_in_order() {
        let first = Counting::new("first");
        let second = Counting::new("second");
        let modules = [first.clone() as Arc<dyn FeatureModule>, second.clone()];
        let registry = ModuleRegistry::from_modules(modules).expect("registry");

        let mut ctx = context();
        let registered = registry.register(&mut ctx).expect("registered");

        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        let names: Vec<_> = registered.infos().into_iter().map(|info| info.name).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(ctx.services().get::<String>().as_deref().map(String::as_str), Some("second"));
    }

    #[test]
    fn registration_failure_stops_startup() {
        let broken = Arc::new(Counting { name: "broken", calls: AtomicUsize::new(0), fail: true });
        let after = Counting::new("after");
        let modules = [broken as Arc<dyn FeatureModule>, after.clone()];
        let registry = ModuleRegistry::from_modules(modules).expect("registry");

        let err = registry.register(&mut context()).expect_err("failure");
        assert!(err.to_string().contains("broken"));
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }
}
