//! Baseline page environments for standalone and direct-injection wiring.

use std::{rc::Rc, time::Duration};

use crate::client::HostClient;
use crate::resolver::{EnvFuture, HostEnvironment};

#[derive(Debug, Clone, Copy, Default)]
/// Environment with no host integration at all.
///
/// Probes find nothing and the document reads as already loaded, so the
/// resolver settles on the inert client without suspension. This is the
/// environment for standalone previews and baseline tests.
pub struct DetachedEnvironment;

impl HostEnvironment for DetachedEnvironment {
    fn probe_client(&self) -> Option<Rc<dyn HostClient>> {
        None
    }

    fn load_complete(&self) -> bool {
        true
    }

    fn wait_load(&self) -> EnvFuture<'_, ()> {
        Box::pin(async {})
    }

    fn sleep(&self, _duration: Duration) -> EnvFuture<'_, ()> {
        Box::pin(async {})
    }
}

#[derive(Clone)]
/// Environment wrapping a concrete client handle supplied by the embedder.
///
/// Resolution settles on the wrapped handle immediately, bypassing page-load
/// timing entirely. This is the direct-injection path for embedders that
/// construct their own [`HostClient`] rather than publishing one on a page
/// global.
pub struct InjectedEnvironment {
    client: Rc<dyn HostClient>,
}

impl InjectedEnvironment {
    /// Wraps `client` as the environment's resolved integration.
    pub fn new(client: Rc<dyn HostClient>) -> Self {
        Self { client }
    }
}

impl HostEnvironment for InjectedEnvironment {
    fn probe_client(&self) -> Option<Rc<dyn HostClient>> {
        Some(Rc::clone(&self.client))
    }

    fn load_complete(&self) -> bool {
        true
    }

    fn wait_load(&self) -> EnvFuture<'_, ()> {
        Box::pin(async {})
    }

    fn sleep(&self, _duration: Duration) -> EnvFuture<'_, ()> {
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::client::NoopClient;
    use crate::resolver::ClientResolver;

    #[test]
    fn detached_environment_resolves_inert() {
        let resolver = ClientResolver::new(Rc::new(DetachedEnvironment), None);
        assert!(block_on(resolver.resolve()).is_inert());
    }

    #[test]
    fn injected_environment_resolves_the_wrapped_handle() {
        let handle: Rc<dyn HostClient> = Rc::new(NoopClient);
        let env = InjectedEnvironment::new(Rc::clone(&handle));
        let resolver = ClientResolver::new(Rc::new(env), None);
        assert!(Rc::ptr_eq(&block_on(resolver.resolve()), &handle));
    }
}
