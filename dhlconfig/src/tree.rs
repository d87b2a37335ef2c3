//! Manipulation de l'arbre YAML : chemins, fusion et normalisation des clés

use anyhow::{Result, bail};
use serde_yaml::{Mapping, Value};

fn key(segment: &str) -> Value {
    Value::String(segment.to_lowercase())
}

/// Lit la valeur située à `path`
pub(crate) fn lookup<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut node = root;
    for (depth, segment) in path.iter().enumerate() {
        let Value::Mapping(map) = node else {
            bail!("{} is not a mapping", path[..depth].join("."));
        };
        match map.get(key(segment)) {
            Some(child) => node = child,
            None => bail!("no value at {}", path[..=depth].join(".")),
        }
    }
    Ok(node)
}

/// Écrit `value` à `path`, en créant les tables intermédiaires manquantes
pub(crate) fn store(root: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        let Value::Mapping(map) = node else {
            bail!("{} is not a mapping", path[..depth].join("."));
        };
        node = map
            .entry(key(segment))
            .or_insert(Value::Mapping(Mapping::new()));
    }

    match node {
        Value::Mapping(map) => {
            map.insert(key(last), value);
            Ok(())
        }
        _ => bail!("{} is not a mapping", parents.join(".")),
    }
}

/// Fusionne `overlay` dans `base`
///
/// Les tables sont fusionnées clé par clé, tout le reste est remplacé.
pub(crate) fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (k, v) in overlay_map {
                match base_map.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, other) => *slot = other,
    }
}

/// Passe récursivement toutes les clés texte en minuscules
pub(crate) fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lowercase_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        scalar => scalar,
    }
}

/// Interprète une variable d'environnement comme un scalaire YAML
///
/// `30` devient un nombre, `true` un booléen ; ce qui ne se lit pas en YAML
/// reste une chaîne.
pub(crate) fn scalar_from_env(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_merge_keeps_defaults_and_overrides_scalars() {
        let mut base = yaml("a: {b: 1, c: 2}\nd: x");
        merge(&mut base, yaml("a: {c: 3}"));
        assert_eq!(base, yaml("a: {b: 1, c: 3}\nd: x"));
    }

    #[test]
    fn test_lowercase_keys() {
        assert_eq!(
            lowercase_keys(yaml("DHL: {Mode: live, List: [{K: v}]}")),
            yaml("dhl: {mode: live, list: [{k: v}]}")
        );
    }

    #[test]
    fn test_store_creates_intermediate_tables() {
        let mut root = yaml("{}");
        store(&mut root, &["DHL", "credentials", "ekp"], Value::from("42")).unwrap();
        assert_eq!(lookup(&root, &["dhl", "Credentials", "ekp"]).unwrap(), &Value::from("42"));
    }

    #[test]
    fn test_store_through_scalar_fails() {
        let mut root = yaml("dhl: sandbox");
        let err = store(&mut root, &["dhl", "mode"], Value::from("live")).unwrap_err();
        assert!(err.to_string().contains("dhl"));
    }

    #[test]
    fn test_lookup_reports_missing_path() {
        let root = yaml("dhl: {mode: live}");
        let err = lookup(&root, &["dhl", "version"]).unwrap_err();
        assert_eq!(err.to_string(), "no value at dhl.version");
    }

    #[test]
    fn test_scalar_from_env() {
        assert_eq!(scalar_from_env("30"), Value::Number(30u64.into()));
        assert_eq!(scalar_from_env("true"), Value::Bool(true));
        assert_eq!(scalar_from_env("live"), Value::from("live"));
        assert_eq!(scalar_from_env("a: [b"), Value::from("a: [b"));
    }
}
