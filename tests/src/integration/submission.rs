//! # Submission Flow Tests
//!
//! Drives the full attempt loop against a scripted ledger: single-attempt
//! acceptance, conflict retries with backoff, exhaustion, transport
//! short-circuits, and the concurrent stress scenario.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::task::JoinSet;

    use relay_core::ports::outbound::AppendOutcome;
    use relay_core::{LedgerError, RelayError, SubmitOutcome, TransactionStatus};

    use crate::support::{relay, ScriptedLedger};

    #[tokio::test]
    async fn submit_succeeds_on_first_attempt() {
        let (service, ledger) = relay(ScriptedLedger::committing());

        let outcome = service.submit("container-7").await.unwrap();
        let id = outcome.transaction_id();
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                transaction_id: id,
                version: 1
            }
        );

        let record = service.record(&id).unwrap();
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.retry_count, 1);
        assert_eq!(record.version, 1);
        assert_eq!(ledger.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_fails_after_exhausting_retries() {
        let (service, ledger) = relay(ScriptedLedger::conflicting());

        let outcome = service.submit("container-7").await.unwrap();
        let id = outcome.transaction_id();
        assert_eq!(outcome, SubmitOutcome::Conflict { transaction_id: id });

        let record = service.record(&id).unwrap();
        assert_eq!(record.status, TransactionStatus::Failed);
        assert_eq!(record.retry_count, 3);
        assert_eq!(record.version, 0);
        assert_eq!(ledger.calls().len(), 3);

        // Three conflicted attempts, one deduplicated log entry.
        let report = service.list_conflicts();
        assert_eq!(report.total_conflicts, 1);
        assert_eq!(report.conflicts[0].resource_id, "container-7");
    }

    #[tokio::test(start_paused = true)]
    async fn conflicts_then_success_recovers_with_backoff() {
        let stub = ScriptedLedger::committing().then_conflict().then_conflict();
        let (service, _ledger) = relay(stub);

        let started = tokio::time::Instant::now();
        let outcome = service.submit("container-42").await.unwrap();
        let elapsed = started.elapsed();

        let id = outcome.transaction_id();
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                transaction_id: id,
                version: 1
            }
        );

        let record = service.record(&id).unwrap();
        assert_eq!(record.retry_count, 3);
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.version, 1);

        // Suspensions: 500ms * 2 after the first conflict, 500ms * 4 after
        // the second.
        assert!(
            elapsed >= Duration::from_millis(3_000),
            "expected at least 3s of backoff, saw {elapsed:?}"
        );

        let report = service.list_conflicts();
        assert_eq!(report.total_conflicts, 1);
        assert!(report.conflicts[0].message.contains("container-42"));
    }

    #[tokio::test]
    async fn transport_failure_short_circuits_without_retry() {
        let (service, ledger) = relay(ScriptedLedger::with_fallback(Err(
            LedgerError::Unreachable("cannot connect to http://localhost:8080".into()),
        )));

        let outcome = service.submit("container-7").await.unwrap();
        let id = outcome.transaction_id();
        assert!(matches!(outcome, SubmitOutcome::Unreachable { .. }));

        let record = service.record(&id).unwrap();
        assert_eq!(record.retry_count, 1);
        assert_eq!(record.status, TransactionStatus::Failed);
        assert_eq!(ledger.calls().len(), 1);
        assert_eq!(service.list_conflicts().total_conflicts, 0);
    }

    #[tokio::test]
    async fn upstream_rejection_is_terminal_with_detail() {
        let (service, _ledger) = relay(ScriptedLedger::with_fallback(Ok(
            AppendOutcome::Rejected {
                code: 503,
                body: r#"{"error": "ledger draining"}"#.to_string(),
            },
        )));

        let outcome = service.submit("container-7").await.unwrap();
        match outcome {
            SubmitOutcome::Upstream { code, detail, .. } => {
                assert_eq!(code, 503);
                assert!(detail.contains("ledger draining"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_resource_is_rejected_before_any_attempt() {
        let (service, ledger) = relay(ScriptedLedger::committing());

        assert!(matches!(
            service.submit("").await,
            Err(RelayError::MissingResourceId)
        ));
        assert!(ledger.calls().is_empty());
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_submissions_stay_isolated() {
        let (service, ledger) = relay(ScriptedLedger::committing());

        let mut tasks = JoinSet::new();
        for i in 0..10 {
            let service = service.clone();
            tasks.spawn(async move {
                let resource_id = format!("container-{i}");
                let outcome = service.submit(&resource_id).await.unwrap();
                (resource_id, outcome)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.unwrap());
        }
        assert_eq!(outcomes.len(), 10);

        for (resource_id, outcome) in outcomes {
            let id = outcome.transaction_id();
            assert_eq!(
                outcome,
                SubmitOutcome::Accepted {
                    transaction_id: id,
                    version: 1
                }
            );

            // No cross-contamination: each record carries only its own
            // resource and version.
            let record = service.record(&id).unwrap();
            assert_eq!(record.resource_id, resource_id);
            assert_eq!(record.version, 1);
            assert_eq!(record.retry_count, 1);
            assert_eq!(record.status, TransactionStatus::Completed);
        }

        assert_eq!(ledger.calls().len(), 10);
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_suspends_only_the_conflicting_submission() {
        // The first submission conflicts once and parks in backoff; the
        // second sails through while it waits.
        let stub = ScriptedLedger::committing().then_conflict();
        let (service, _ledger) = relay(stub);

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.submit("container-slow").await.unwrap() })
        };

        // Give the slow submission time to hit its first conflict and park.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = tokio::time::Instant::now();
        let fast = service.submit("container-fast").await.unwrap();
        assert!(fast.is_accepted());
        assert!(
            started.elapsed() < Duration::from_millis(100),
            "independent submission must not wait on another's backoff"
        );

        let slow_outcome = slow.await.unwrap();
        assert!(slow_outcome.is_accepted());
    }

    #[tokio::test]
    async fn first_attempt_always_submits_version_zero() {
        let (service, ledger) = relay(ScriptedLedger::committing());

        service.submit("container-7").await.unwrap();
        service.submit("container-7").await.unwrap();

        let calls = ledger.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| call.version == 0));
        // Two submissions are two distinct transactions.
        assert_ne!(calls[0].transaction_id, calls[1].transaction_id);
    }
}
