//! Client resolution: decides, exactly once, between the real host client
//! and the inert stand-in.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc, time::Duration};

use futures::future::{self, Either, FutureExt, LocalBoxFuture, Shared};

use crate::client::{HostClient, NoopClient};

/// Default bound on the load-completion wait before falling back to the
/// inert client.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Object-safe boxed future used by [`HostEnvironment`] async methods.
pub type EnvFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Page environment the resolver observes, injected at construction.
///
/// Only implementations of this trait touch ambient page state; the resolver
/// itself never reads globals. The browser implementation lives in the web
/// adapter crate; [`DetachedEnvironment`](crate::DetachedEnvironment) and
/// [`InjectedEnvironment`](crate::InjectedEnvironment) cover standalone and
/// direct-injection wiring.
pub trait HostEnvironment {
    /// Probes the host integration point for the real client.
    fn probe_client(&self) -> Option<Rc<dyn HostClient>>;

    /// Whether the hosting document has finished loading all resources.
    fn load_complete(&self) -> bool;

    /// Resolves when the document's load-completion signal fires.
    fn wait_load(&self) -> EnvFuture<'_, ()>;

    /// Resolves after `duration` has elapsed.
    fn sleep(&self, duration: Duration) -> EnvFuture<'_, ()>;
}

/// Resolution progress of the shared client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// No resolution attempt has been made yet.
    Unresolved,
    /// A resolution is registered and waiting on the page environment.
    Pending,
    /// Terminal: the shared handle is settled and will never change.
    Resolved,
}

impl ResolutionState {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

type SharedResolution = Shared<LocalBoxFuture<'static, Rc<dyn HostClient>>>;

/// Lazily resolves the single shared [`HostClient`] handle.
///
/// The first [`resolve`](ClientResolver::resolve) call settles the choice
/// between the real host client and [`NoopClient`]:
///
/// 1. a client already present in the environment resolves immediately;
/// 2. a document that already finished loading without a client resolves
///    immediately to the inert client — past that point no further script
///    injection is expected, and waiting would hang when the host script
///    was blocked;
/// 3. otherwise one wait is registered on the load signal, bounded by the
///    configured timeout, and the environment is probed once more when
///    either fires.
///
/// Every caller, before or after the transition, observes the same handle.
/// Concurrent callers during the wait share the single registered
/// resolution in issuance order. Resolution cannot fail: an absent host
/// integration is the designed trigger for the inert fallback, announced by
/// a one-time diagnostic notice.
pub struct ClientResolver {
    env: Rc<dyn HostEnvironment>,
    timeout: Option<Duration>,
    memo: RefCell<Option<SharedResolution>>,
}

impl ClientResolver {
    /// Creates a resolver over the injected page environment.
    ///
    /// `timeout` bounds the load-completion wait; `None` waits unbounded.
    pub fn new(env: Rc<dyn HostEnvironment>, timeout: Option<Duration>) -> Self {
        Self {
            env,
            timeout,
            memo: RefCell::new(None),
        }
    }

    /// Resolves the shared client handle.
    ///
    /// Completes without suspension whenever the outcome is already decided
    /// (cases 1–3 above, or any call after the first settles).
    pub async fn resolve(&self) -> Rc<dyn HostClient> {
        self.resolution().await
    }

    /// Current progress of the shared resolution.
    pub fn state(&self) -> ResolutionState {
        match self.memo.borrow().as_ref() {
            None => ResolutionState::Unresolved,
            Some(shared) => {
                if shared.peek().is_some() {
                    ResolutionState::Resolved
                } else {
                    ResolutionState::Pending
                }
            }
        }
    }

    fn resolution(&self) -> SharedResolution {
        if let Some(existing) = self.memo.borrow().as_ref() {
            return existing.clone();
        }
        let started = self.begin_resolution();
        *self.memo.borrow_mut() = Some(started.clone());
        started
    }

    fn begin_resolution(&self) -> SharedResolution {
        if let Some(client) = self.env.probe_client() {
            log::debug!("host client present at first use");
            return future::ready(client).boxed_local().shared();
        }

        if self.env.load_complete() {
            // Load finished and the client global never appeared: the host
            // script failed on the network or was blocked.
            let client = fall_back("document load already complete");
            return future::ready(client).boxed_local().shared();
        }

        let env = Rc::clone(&self.env);
        let timeout = self.timeout;
        async move {
            match timeout {
                Some(limit) => {
                    let load = env.wait_load();
                    let expiry = env.sleep(limit);
                    match future::select(load, expiry).await {
                        Either::Left(((), _)) => log::debug!("document load signal fired"),
                        Either::Right(((), _)) => {
                            log::debug!("load wait expired after {limit:?}");
                        }
                    }
                }
                None => env.wait_load().await,
            }
            env.probe_client()
                .unwrap_or_else(|| fall_back("host client absent after document load"))
        }
        .boxed_local()
        .shared()
    }
}

fn fall_back(reason: &str) -> Rc<dyn HostClient> {
    log::warn!("host player client unavailable ({reason}); continuing with the inert client");
    Rc::new(NoopClient)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;

    use super::*;

    /// Environment double whose load signal and timers fire on demand.
    #[derive(Default)]
    struct ManualEnvironment {
        client: RefCell<Option<Rc<dyn HostClient>>>,
        complete: Cell<bool>,
        load_waits: Cell<usize>,
        load_waiters: RefCell<Vec<oneshot::Sender<()>>>,
        sleep_waiters: RefCell<Vec<oneshot::Sender<()>>>,
    }

    impl ManualEnvironment {
        fn install_client(&self) {
            *self.client.borrow_mut() = Some(Rc::new(NoopClient));
        }

        fn installed_client(&self) -> Rc<dyn HostClient> {
            self.client.borrow().clone().expect("client installed")
        }

        fn fire_load(&self) {
            for waiter in self.load_waiters.borrow_mut().drain(..) {
                let _ = waiter.send(());
            }
        }

        fn fire_sleep(&self) {
            for waiter in self.sleep_waiters.borrow_mut().drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    impl HostEnvironment for ManualEnvironment {
        fn probe_client(&self) -> Option<Rc<dyn HostClient>> {
            self.client.borrow().clone()
        }

        fn load_complete(&self) -> bool {
            self.complete.get()
        }

        fn wait_load(&self) -> EnvFuture<'_, ()> {
            self.load_waits.set(self.load_waits.get() + 1);
            let (tx, rx) = oneshot::channel();
            self.load_waiters.borrow_mut().push(tx);
            Box::pin(async move {
                let _ = rx.await;
            })
        }

        fn sleep(&self, _duration: Duration) -> EnvFuture<'_, ()> {
            let (tx, rx) = oneshot::channel();
            self.sleep_waiters.borrow_mut().push(tx);
            Box::pin(async move {
                let _ = rx.await;
            })
        }
    }

    fn resolver_over(env: &Rc<ManualEnvironment>) -> Rc<ClientResolver> {
        Rc::new(ClientResolver::new(
            Rc::clone(env) as Rc<dyn HostEnvironment>,
            Some(DEFAULT_RESOLVE_TIMEOUT),
        ))
    }

    #[test]
    fn client_present_at_first_use_resolves_without_load_wait() {
        let env = Rc::new(ManualEnvironment::default());
        env.install_client();
        let resolver = resolver_over(&env);

        // block_on would hang if the resolver registered a load wait.
        let resolved = block_on(resolver.resolve());
        assert!(Rc::ptr_eq(&resolved, &env.installed_client()));
        assert_eq!(env.load_waits.get(), 0);
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[test]
    fn complete_document_without_client_resolves_inert_immediately() {
        let env = Rc::new(ManualEnvironment::default());
        env.complete.set(true);
        let resolver = resolver_over(&env);

        let resolved = block_on(resolver.resolve());
        assert!(resolved.is_inert());
        assert_eq!(env.load_waits.get(), 0);
    }

    #[test]
    fn callers_before_load_share_one_wait_and_one_handle() {
        let env = Rc::new(ManualEnvironment::default());
        let resolver = resolver_over(&env);

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let first = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn first caller")
        };
        let second = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn second caller")
        };

        pool.run_until_stalled();
        assert_eq!(resolver.state(), ResolutionState::Pending);
        assert_eq!(env.load_waits.get(), 1);

        env.install_client();
        env.fire_load();
        let first = pool.run_until(first);
        let second = pool.run_until(second);
        assert!(Rc::ptr_eq(&first, &second));
        assert!(Rc::ptr_eq(&first, &env.installed_client()));
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[test]
    fn load_without_client_falls_back_to_inert_for_all_callers() {
        let env = Rc::new(ManualEnvironment::default());
        let resolver = resolver_over(&env);

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let first = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn first caller")
        };

        pool.run_until_stalled();
        env.fire_load();
        let first = pool.run_until(first);
        assert!(first.is_inert());

        // Late callers observe the settled handle, not a new resolution.
        let late = pool.run_until(resolver.resolve());
        assert!(Rc::ptr_eq(&first, &late));
        assert_eq!(env.load_waits.get(), 1);
    }

    #[test]
    fn expired_wait_falls_back_when_no_client_appeared() {
        let env = Rc::new(ManualEnvironment::default());
        let resolver = resolver_over(&env);

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let caller = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn caller")
        };

        pool.run_until_stalled();
        env.fire_sleep();
        let resolved = pool.run_until(caller);
        assert!(resolved.is_inert());
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[test]
    fn expired_wait_still_honors_a_late_arriving_client() {
        let env = Rc::new(ManualEnvironment::default());
        let resolver = resolver_over(&env);

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let caller = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn caller")
        };

        pool.run_until_stalled();
        env.install_client();
        env.fire_sleep();
        let resolved = pool.run_until(caller);
        assert!(Rc::ptr_eq(&resolved, &env.installed_client()));
    }

    #[test]
    fn unbounded_resolver_registers_no_timer() {
        let env = Rc::new(ManualEnvironment::default());
        let resolver = Rc::new(ClientResolver::new(
            Rc::clone(&env) as Rc<dyn HostEnvironment>,
            None,
        ));

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let caller = {
            let resolver = Rc::clone(&resolver);
            spawner
                .spawn_local_with_handle(async move { resolver.resolve().await })
                .expect("spawn caller")
        };

        pool.run_until_stalled();
        assert!(env.sleep_waiters.borrow().is_empty());
        env.fire_load();
        assert!(pool.run_until(caller).is_inert());
    }

    #[test]
    fn resolved_state_is_terminal_and_stable() {
        let env = Rc::new(ManualEnvironment::default());
        env.complete.set(true);
        let resolver = resolver_over(&env);
        assert_eq!(resolver.state(), ResolutionState::Unresolved);

        let first = block_on(resolver.resolve());
        assert_eq!(resolver.state(), ResolutionState::Resolved);

        // A client appearing after settlement changes nothing.
        env.install_client();
        let second = block_on(resolver.resolve());
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn state_tokens_are_stable() {
        assert_eq!(ResolutionState::Unresolved.as_str(), "unresolved");
        assert_eq!(ResolutionState::Pending.as_str(), "pending");
        assert_eq!(ResolutionState::Resolved.as_str(), "resolved");
    }
}
