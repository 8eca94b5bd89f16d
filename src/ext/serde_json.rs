// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path fetching and typed extraction over serde_json::Value, used to read issue-tracker exports
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched handle (typed, text and array-item reads)
// invariants: No panics; missing paths yield None or an empty slice; to_or_default returns T::default on failure
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A location inside a tracker payload, possibly absent. Issue exports omit
/// fields freely, so every read on it is optional.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// Deserialize the value as `T`; `None` when absent or of another shape.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Trimmed, non-empty string. Rich-text documents and other non-strings are `None`.
  pub fn text(&self) -> Option<String> {
    self.inner.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
  }

  /// Elements of an array without cloning them; empty when absent or not an array.
  pub fn items(&self) -> &'a [Value] {
    self.inner.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Like `to`, falling back to `T::default()`.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }
}

/// Dotted-path lookup into issue payloads, e.g. `fields.status.name` or `changelog.histories`.
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
