//! The borrowing status state machine.
//!
//! A borrowing is created directly into `pending`. Admin resolution is a
//! single overloaded operation: the same accept/reject pair settles three
//! different pending states. For `cancel-pending` and `return-pending` the
//! verdict does not matter: either one finalizes the request as
//! `cancelled`/`returned` and frees the device. That mirrors the behavior
//! this system has always had; denying a cancellation does not restore the
//! borrowing to `accepted`.
//!
//! ```text
//! pending ──approve──> accepted ──cancel-request──> cancel-pending ──either──> cancelled
//!    │                    │
//!    │                    └──return-request──> return-pending ──either──> returned
//!    └──deny──> rejected (device freed)
//! ```
//!
//! `pending` may also take a cancel-request. The device is released when a
//! borrowing settles into `rejected`, `cancelled` or `returned`, keeping the
//! device-status invariant: borrowed iff some live borrowing references it.

use thiserror::Error;

use super::model::BorrowingStatus;

/// Administrative verdict on a pending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Deny,
}

/// Outcome of resolving a pending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub next: BorrowingStatus,
    /// Whether the device flips back to `available` as part of this step
    pub releases_device: bool,
}

/// The requested transition is not legal from the current status
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot {action} a borrowing in status '{current}'")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub current: BorrowingStatus,
}

/// Resolve a pending state with an administrative verdict.
pub fn resolve(
    current: BorrowingStatus,
    verdict: Verdict,
) -> Result<Resolution, InvalidTransition> {
    match (current, verdict) {
        (BorrowingStatus::Pending, Verdict::Approve) => Ok(Resolution {
            next: BorrowingStatus::Accepted,
            releases_device: false,
        }),
        // Rejection frees the device: a rejected request never got the
        // device, and nothing else would ever release it.
        (BorrowingStatus::Pending, Verdict::Deny) => Ok(Resolution {
            next: BorrowingStatus::Rejected,
            releases_device: true,
        }),
        // Either verdict finalizes a cancellation or return request.
        (BorrowingStatus::CancelPending, _) => Ok(Resolution {
            next: BorrowingStatus::Cancelled,
            releases_device: true,
        }),
        (BorrowingStatus::ReturnPending, _) => Ok(Resolution {
            next: BorrowingStatus::Returned,
            releases_device: true,
        }),
        _ => Err(InvalidTransition {
            action: "resolve",
            current,
        }),
    }
}

/// Borrower-initiated cancellation request. Allowed from `pending`
/// and `accepted`; the device stays borrowed until an admin resolves it.
pub fn request_cancel(current: BorrowingStatus) -> Result<BorrowingStatus, InvalidTransition> {
    match current {
        BorrowingStatus::Pending | BorrowingStatus::Accepted => Ok(BorrowingStatus::CancelPending),
        _ => Err(InvalidTransition {
            action: "request cancellation of",
            current,
        }),
    }
}

/// Borrower-initiated return request. Allowed from `accepted` only.
pub fn request_return(current: BorrowingStatus) -> Result<BorrowingStatus, InvalidTransition> {
    match current {
        BorrowingStatus::Accepted => Ok(BorrowingStatus::ReturnPending),
        _ => Err(InvalidTransition {
            action: "request return of",
            current,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BorrowingStatus::*;

    #[test]
    fn test_resolve_pending() {
        let accepted = resolve(Pending, Verdict::Approve).unwrap();
        assert_eq!(accepted.next, Accepted);
        assert!(!accepted.releases_device);

        let rejected = resolve(Pending, Verdict::Deny).unwrap();
        assert_eq!(rejected.next, Rejected);
        assert!(rejected.releases_device);
    }

    #[test]
    fn test_resolve_cancel_pending_ignores_verdict() {
        for verdict in [Verdict::Approve, Verdict::Deny] {
            let r = resolve(CancelPending, verdict).unwrap();
            assert_eq!(r.next, Cancelled);
            assert!(r.releases_device);
        }
    }

    #[test]
    fn test_resolve_return_pending_ignores_verdict() {
        for verdict in [Verdict::Approve, Verdict::Deny] {
            let r = resolve(ReturnPending, verdict).unwrap();
            assert_eq!(r.next, Returned);
            assert!(r.releases_device);
        }
    }

    #[test]
    fn test_resolve_rejects_settled_states() {
        for status in [Accepted, Rejected, Cancelled, Returned] {
            for verdict in [Verdict::Approve, Verdict::Deny] {
                let err = resolve(status, verdict).unwrap_err();
                assert_eq!(err.current, status);
            }
        }
    }

    #[test]
    fn test_request_cancel() {
        assert_eq!(request_cancel(Pending).unwrap(), CancelPending);
        assert_eq!(request_cancel(Accepted).unwrap(), CancelPending);

        for status in [Rejected, CancelPending, Cancelled, ReturnPending, Returned] {
            assert!(request_cancel(status).is_err());
        }
    }

    #[test]
    fn test_request_return() {
        assert_eq!(request_return(Accepted).unwrap(), ReturnPending);

        // Return is never allowed from pending; the device was not handed
        // over yet. And a cancelled borrowing cannot come back as a return.
        for status in [Pending, Rejected, CancelPending, Cancelled, ReturnPending, Returned] {
            assert!(request_return(status).is_err());
        }
    }

    #[test]
    fn test_holds_device_matches_release_edges() {
        // Any state that still holds the device must either resolve into a
        // releasing transition or stay holding; terminal free states never
        // hold.
        for status in [Pending, Accepted, CancelPending, ReturnPending] {
            assert!(status.holds_device());
        }
        for status in [Rejected, Cancelled, Returned] {
            assert!(!status.holds_device());
        }
    }
}
