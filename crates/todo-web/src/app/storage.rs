use todo_core::{
  KeyValueStore,
  MemoryStore,
  StorageError
};
use wasm_bindgen::{
  JsCast,
  JsValue
};

/// `window.localStorage`, or an in-memory
/// stand-in when the browser refuses
/// access (private mode, disabled
/// storage). The stand-in keeps the page
/// usable for the session.
pub enum BrowserStore {
  Local(web_sys::Storage),
  Memory(MemoryStore)
}

impl BrowserStore {
  pub fn open() -> Self {
    let storage = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });

    match storage {
      | Some(storage) => {
        tracing::debug!(
          "using window.localStorage"
        );
        BrowserStore::Local(storage)
      }
      | None => {
        tracing::warn!(
          "localStorage unavailable; \
           tasks will not survive a \
           reload"
        );
        BrowserStore::Memory(
          MemoryStore::new()
        )
      }
    }
  }
}

impl KeyValueStore for BrowserStore {
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    match self {
      | BrowserStore::Local(storage) => {
        storage
          .get_item(key)
          .map_err(unavailable)
      }
      | BrowserStore::Memory(memory) => {
        memory.get(key)
      }
    }
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    match self {
      | BrowserStore::Local(storage) => {
        storage
          .set_item(key, value)
          .map_err(|err| {
            if dom_error_name(&err)
              .as_deref()
              == Some(
                "QuotaExceededError"
              )
            {
              StorageError::QuotaExceeded {
                key:       key
                  .to_string(),
                needed:    key.len()
                  + value.len(),
                available: 0
              }
            } else {
              unavailable(err)
            }
          })
      }
      | BrowserStore::Memory(memory) => {
        memory.set(key, value)
      }
    }
  }

  fn remove(
    &mut self,
    key: &str
  ) -> Result<(), StorageError> {
    match self {
      | BrowserStore::Local(storage) => {
        storage
          .remove_item(key)
          .map_err(unavailable)
      }
      | BrowserStore::Memory(memory) => {
        memory.remove(key)
      }
    }
  }
}

fn dom_error_name(
  err: &JsValue
) -> Option<String> {
  err
    .dyn_ref::<web_sys::DomException>()
    .map(|exception| exception.name())
}

fn unavailable(
  err: JsValue
) -> StorageError {
  let detail = dom_error_name(&err)
    .or_else(|| err.as_string())
    .unwrap_or_else(|| {
      format!("{err:?}")
    });
  StorageError::Unavailable(detail)
}
