use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 一次发布产生的账本快照
///
/// `question_map`: 题目名 → HITId
/// `qualification_map`: 资格名 → QualificationTypeId
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub question_map: BTreeMap<String, String>,
    #[serde(default)]
    pub qualification_map: BTreeMap<String, String>,
}

impl LedgerSnapshot {
    /// 合并另一份快照，同名键以 `later` 为准
    pub fn absorb(&mut self, later: LedgerSnapshot) {
        self.question_map.extend(later.question_map);
        self.qualification_map.extend(later.qualification_map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(questions: &[(&str, &str)], quals: &[(&str, &str)]) -> LedgerSnapshot {
        LedgerSnapshot {
            question_map: questions
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            qualification_map: quals
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_absorb_is_last_write_wins() {
        let mut ledger = snapshot(&[("q1", "H1"), ("q2", "H2")], &[("skill", "OLD")]);
        ledger.absorb(snapshot(&[("q2", "H2b"), ("q3", "H3")], &[("skill", "NEW")]));

        assert_eq!(ledger.question_map.len(), 3);
        assert_eq!(ledger.question_map["q2"], "H2b");
        assert_eq!(ledger.qualification_map["skill"], "NEW");
    }

    #[test]
    fn test_missing_maps_default_to_empty() {
        let parsed: LedgerSnapshot = serde_json::from_str(r#"{"question_map": {"a": "1"}}"#).unwrap();
        assert!(parsed.qualification_map.is_empty());
        assert_eq!(parsed.question_map["a"], "1");
    }
}
