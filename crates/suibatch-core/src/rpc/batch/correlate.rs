use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;

use crate::error::CallError;

use super::protocol::{CallSpec, Outcome, ReplyEntry};
use super::request_id::RequestId;

/// Protocol irregularity seen while correlating a reply. Anomalies never
/// fail the batch; they are reported next to the best-effort result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// The reply carried an id no call of the batch was issued with.
    UnknownId(RequestId),
    /// The reply carried the same id more than once; the last entry won.
    DuplicateId(RequestId),
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "reply carried unknown id {id}"),
            Self::DuplicateId(id) => write!(f, "reply repeated id {id}"),
        }
    }
}

/// Per-call outcomes of a batch, positionally aligned with the calls as the
/// caller submitted them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResult {
    outcomes: Vec<Outcome>,
    anomalies: Vec<Anomaly>,
}

impl BatchResult {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }

    /// Concatenate the result of a later chunk of the same logical batch.
    pub(crate) fn append(&mut self, mut later: BatchResult) {
        self.outcomes.append(&mut later.outcomes);
        self.anomalies.append(&mut later.anomalies);
    }
}

impl Index<usize> for BatchResult {
    type Output = Outcome;

    fn index(&self, index: usize) -> &Outcome {
        &self.outcomes[index]
    }
}

impl IntoIterator for BatchResult {
    type Item = Outcome;
    type IntoIter = std::vec::IntoIter<Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

/// Align `replies` with `specs` by id.
///
/// The result has exactly one outcome per spec, in spec order, regardless of
/// reply order. Specs without a reply resolve to
/// [`CallError::MissingResponse`]; replies for unknown ids are dropped.
pub fn correlate(specs: &[CallSpec], replies: Vec<ReplyEntry>) -> BatchResult {
    let issued: HashSet<RequestId> = specs.iter().map(|spec| spec.id).collect();
    let mut by_id: HashMap<RequestId, Outcome> = HashMap::with_capacity(replies.len());
    let mut anomalies = Vec::new();

    for reply in replies {
        if !issued.contains(&reply.id) {
            anomalies.push(Anomaly::UnknownId(reply.id));
            continue;
        }
        if by_id.insert(reply.id, reply.outcome).is_some() {
            anomalies.push(Anomaly::DuplicateId(reply.id));
        }
    }

    let outcomes = specs
        .iter()
        .map(|spec| {
            by_id
                .remove(&spec.id)
                .unwrap_or(Err(CallError::MissingResponse { id: spec.id }))
        })
        .collect();

    BatchResult {
        outcomes,
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use serde_json::{json, Value};

    use super::*;

    fn specs(ids: &[u64]) -> Vec<CallSpec> {
        ids.iter()
            .map(|&id| CallSpec {
                id: RequestId(id),
                method: "sui_getObject".to_owned(),
                params: vec![json!(id)],
            })
            .collect()
    }

    fn ok(id: u64, result: Value) -> ReplyEntry {
        ReplyEntry {
            id: RequestId(id),
            outcome: Ok(result),
        }
    }

    #[test]
    fn partial_reply_yields_missing_response_in_place() {
        let result = correlate(&specs(&[1, 2, 3]), vec![ok(3, json!("c")), ok(1, json!("a"))]);
        assert_eq!(
            result.outcomes(),
            &[
                Ok(json!("a")),
                Err(CallError::MissingResponse { id: RequestId(2) }),
                Ok(json!("c")),
            ]
        );
        assert!(result.anomalies().is_empty());
    }

    #[test]
    fn reply_order_does_not_change_result() {
        let ids: Vec<u64> = (100..140).collect();
        let specs = specs(&ids);
        let replies: Vec<ReplyEntry> = ids.iter().map(|&id| ok(id, json!(id))).collect();
        let baseline = correlate(&specs, replies.clone());

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let mut shuffled = replies.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(correlate(&specs, shuffled), baseline);
        }
        for (id, outcome) in ids.iter().zip(baseline.iter()) {
            assert_eq!(outcome, &Ok(json!(id)));
        }
    }

    #[test]
    fn duplicate_reply_id_is_last_write_wins_and_reported() {
        let result = correlate(
            &specs(&[7]),
            vec![ok(7, json!("first")), ok(7, json!("second"))],
        );
        assert_eq!(result[0], Ok(json!("second")));
        assert_eq!(result.anomalies(), &[Anomaly::DuplicateId(RequestId(7))]);
    }

    #[test]
    fn unknown_reply_id_is_dropped_and_reported() {
        let result = correlate(&specs(&[1]), vec![ok(1, json!(1)), ok(99, json!(99))]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], Ok(json!(1)));
        assert_eq!(result.anomalies(), &[Anomaly::UnknownId(RequestId(99))]);
    }

    #[test]
    fn per_call_errors_stay_in_their_slot() {
        let replies = vec![
            ok(2, json!("fine")),
            ReplyEntry {
                id: RequestId(1),
                outcome: Err(CallError::Server {
                    code: -32000,
                    message: "object deleted".into(),
                }),
            },
        ];
        let result = correlate(&specs(&[1, 2]), replies);
        assert!(matches!(result[0], Err(CallError::Server { code: -32000, .. })));
        assert_eq!(result[1], Ok(json!("fine")));
    }

    #[test]
    fn append_concatenates_chunks_in_order() {
        let mut first = correlate(&specs(&[1]), vec![ok(1, json!(1))]);
        let second = correlate(&specs(&[2]), vec![ok(2, json!(2)), ok(5, json!(5))]);
        first.append(second);
        assert_eq!(first.outcomes(), &[Ok(json!(1)), Ok(json!(2))]);
        assert_eq!(first.anomalies(), &[Anomaly::UnknownId(RequestId(5))]);
    }
}
