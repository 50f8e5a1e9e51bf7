//! Precompute Context Manager: the "before" half of the two-phase protocol.

use crate::descriptor::Algorithm;
use crate::primitive::{AeadPrimitive, PrecomputedState};
use aeadx_core::{check_len, AeadError, Constraint};
use core::fmt;

/// Expanded key state for one algorithm.
///
/// Owned by the caller. The context remembers which algorithm produced it,
/// and handing it to another algorithm's `*_afternm` is rejected with
/// `AlgorithmMismatch` rather than reinterpreted.
pub struct PrecomputedContext {
    state: PrecomputedState,
}

impl PrecomputedContext {
    pub fn algorithm(&self) -> Algorithm {
        self.state.algorithm()
    }

    /// STATEBYTES of the producing algorithm.
    pub fn state_len(&self) -> usize {
        self.algorithm().descriptor().state_size
    }

    pub(crate) fn state(&self) -> &PrecomputedState {
        &self.state
    }
}

impl fmt::Debug for PrecomputedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecomputedContext")
            .field("algorithm", &self.algorithm())
            .field("state", &format_args!("<{} bytes>", self.state_len()))
            .finish()
    }
}

/// Expands `key` once so later `*_afternm` calls skip the key schedule.
pub fn before<P: AeadPrimitive>(key: &[u8]) -> Result<PrecomputedContext, AeadError> {
    let descriptor = P::ALGORITHM.descriptor();
    if !descriptor.supports_precompute {
        return Err(AeadError::UnsupportedAlgorithm {
            algorithm: P::ALGORITHM.name(),
        });
    }
    check_len("key", key, Constraint::Exact(descriptor.key_length))?;

    // Documented as infallible for a correctly sized key; handled anyway.
    let cipher = P::expand(key).map_err(|status| AeadError::Primitive {
        operation: "key expansion",
        status,
    })?;
    let state = P::store(cipher).ok_or(AeadError::UnsupportedAlgorithm {
        algorithm: P::ALGORITHM.name(),
    })?;

    tracing::trace!(algorithm = P::ALGORITHM.name(), "key expanded");
    Ok(PrecomputedContext { state })
}

/// Borrows the expanded cipher for `P`, refusing contexts from other algorithms.
pub(crate) fn resolve<P: AeadPrimitive>(
    context: &PrecomputedContext,
) -> Result<&P::Cipher, AeadError> {
    let mismatch = AeadError::AlgorithmMismatch {
        expected: P::ALGORITHM.name(),
        found: context.algorithm().name(),
    };
    if context.algorithm() != P::ALGORITHM {
        return Err(mismatch);
    }
    let descriptor = P::ALGORITHM.descriptor();
    if !descriptor.supports_precompute {
        return Err(AeadError::UnsupportedAlgorithm {
            algorithm: P::ALGORITHM.name(),
        });
    }
    if context.state_len() != descriptor.state_size {
        return Err(mismatch);
    }
    P::load(context.state()).ok_or(mismatch)
}
