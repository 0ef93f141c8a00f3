//! Ordered hook chains.
//!
//! A chain applies its hooks strictly left to right: running `[f, g]` on `x`
//! yields `g(f(x))`. The first hook to fail stops the chain and its error is
//! returned.
//!
//! Three chains surround every request:
//!
//! | Chain | Hook type | Runs |
//! |---|---|---|
//! | preprocessors | `BoxedHandler -> BoxedHandler` | before the handler, wrapping it |
//! | postprocessors | `Reply -> Reply` | on the handler's return value |
//! | finalizers | `Response -> Response` | on the built response |
//!
//! Chains are filled at setup time and only read while serving requests.

use crate::types::{BoxedHandler, Response};
use std::fmt;
use std::sync::Arc;
use talaria_core::{ApiResult, Reply};

/// A single transform in a chain.
pub type Hook<T> = Arc<dyn Fn(T) -> ApiResult<T> + Send + Sync>;

/// Wraps the handler before it is invoked.
pub type Preprocessors = HookChain<BoxedHandler>;

/// Transforms the handler's return value.
pub type Postprocessors = HookChain<Reply>;

/// Transforms the response object.
pub type Finalizers = HookChain<Response>;

/// Applies each hook in turn, feeding every output into the next hook.
///
/// ```
/// use std::sync::Arc;
/// use talaria_core::ApiResult;
/// use talaria_middleware::hooks::{apply_all, Hook};
///
/// let add: Hook<i32> = Arc::new(|x: i32| -> ApiResult<i32> { Ok(x + 1) });
/// let double: Hook<i32> = Arc::new(|x: i32| -> ApiResult<i32> { Ok(x * 2) });
///
/// assert_eq!(apply_all(&[add.clone(), double.clone()], 3).unwrap(), 8);
/// assert_eq!(apply_all(&[double, add], 3).unwrap(), 7);
/// ```
pub fn apply_all<T>(hooks: &[Hook<T>], value: T) -> ApiResult<T> {
    hooks.iter().try_fold(value, |value, hook| hook(value))
}

/// An ordered list of hooks of one type.
pub struct HookChain<T> {
    hooks: Vec<Hook<T>>,
}

impl<T> HookChain<T> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends a hook.
    pub fn push<F>(&mut self, hook: F)
    where
        F: Fn(T) -> ApiResult<T> + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    /// Appends an already shared hook.
    pub fn push_shared(&mut self, hook: Hook<T>) {
        self.hooks.push(hook);
    }

    /// The hooks in application order.
    #[must_use]
    pub fn hooks(&self) -> &[Hook<T>] {
        &self.hooks
    }

    /// The number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs the chain on a value.
    pub fn apply(&self, value: T) -> ApiResult<T> {
        apply_all(&self.hooks, value)
    }
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HookChain<T> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<T> FromIterator<Hook<T>> for HookChain<T> {
    fn from_iter<I: IntoIterator<Item = Hook<T>>>(iter: I) -> Self {
        Self {
            hooks: iter.into_iter().collect(),
        }
    }
}

impl<T> fmt::Debug for HookChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use talaria_core::ApiError;

    #[test]
    fn test_apply_all_is_left_to_right() {
        let mut chain = HookChain::<String>::new();
        chain.push(|s| Ok(format!("f({s})")));
        chain.push(|s| Ok(format!("g({s})")));

        assert_eq!(chain.apply("x".to_string()).unwrap(), "g(f(x))");
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = HookChain::<i32>::default();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(7).unwrap(), 7);
    }

    #[test]
    fn test_first_error_stops_the_chain() {
        let reached = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = reached.clone();

        let mut chain = HookChain::<i32>::new();
        chain.push(|_| Err(ApiError::unauthorized()));
        chain.push(move |x| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(x)
        });

        let err = chain.apply(1).unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
        assert!(!reached.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_postprocessor_chain_on_payload() {
        let mut chain = Postprocessors::new();
        chain.push(|mut reply: Reply| {
            if let Some(serde_json::Value::Object(map)) = reply.payload_mut() {
                map.insert("something".into(), json!(42));
            }
            Ok(reply)
        });

        let reply = chain.apply(Reply::Payload(json!({"value": 200}))).unwrap();
        assert_eq!(reply.payload(), Some(&json!({"something": 42, "value": 200})));
    }

    #[test]
    fn test_from_iterator_keeps_order() {
        let hooks: Vec<Hook<Vec<u8>>> = (0..3u8)
            .map(|i| -> Hook<Vec<u8>> {
                Arc::new(move |mut v: Vec<u8>| -> ApiResult<Vec<u8>> {
                    v.push(i);
                    Ok(v)
                })
            })
            .collect();

        let chain: HookChain<Vec<u8>> = hooks.into_iter().collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.apply(Vec::new()).unwrap(), [0, 1, 2]);
    }
}
