use anyhow::{Result, bail};
use mindmaze_game::{decode_share_code, encode_share_code};
use std::collections::HashMap;

/// Seed metadata carried through a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// The code the seed was given as, or a freshly encoded one.
    #[must_use]
    pub fn share_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_share_code(self.seed))
    }
}

/// Resolve CLI seed arguments into canonical seeds.
///
/// Accepts decimal integers (negative values use their magnitude) and `MM-` share codes.
/// Duplicates collapse, preferring the entry that carries a share code.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let info = if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else if let Some(seed) = decode_share_code(token) {
            SeedInfo::from_share_code(seed, token.trim().to_uppercase())
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        match index.get(&info.seed).and_then(|&at| deduped.get_mut(at)) {
            Some(entry) => {
                if entry.code.is_none() && info.code.is_some() {
                    *entry = info;
                }
            }
            None => {
                index.insert(info.seed, deduped.len());
                deduped.push(info);
            }
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_share_code() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "mm-lantern42".to_string(),
        ];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(seeds.len(), 3);
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.code.is_none()));
        assert!(
            seeds
                .iter()
                .any(|s| s.code.as_deref() == Some("MM-LANTERN42"))
        );
    }

    #[test]
    fn duplicates_prefer_share_code() {
        let code = "MM-SPHINX07".to_string();
        let seed = decode_share_code(&code).unwrap();
        let seeds = resolve_seed_inputs(&[seed.to_string(), code.clone()]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_share_code(seed, code)]);
    }

    #[test]
    fn empty_input_defaults_and_garbage_fails() {
        assert_eq!(
            resolve_seed_inputs(&[]).unwrap(),
            vec![SeedInfo::from_numeric(1337)]
        );
        assert!(resolve_seed_inputs(&["not-a-seed".to_string()]).is_err());
    }

    #[test]
    fn share_code_falls_back_to_encoding() {
        let info = SeedInfo::from_numeric(99);
        assert!(info.share_code().starts_with("MM-"));
    }
}
