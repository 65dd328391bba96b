use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace
};

use crate::notice::DEFAULT_NOTICE_DURATION;

pub const DEFAULT_LISTEN: &str =
  "127.0.0.1:8080";
pub const DEFAULT_WEB_ROOT: &str =
  "crates/todo-web/dist";
pub const DEFAULT_INDEX: &str =
  "index.html";

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "server.listen".to_string(),
      DEFAULT_LISTEN.to_string()
    );
    map.insert(
      "server.root".to_string(),
      DEFAULT_WEB_ROOT.to_string()
    );
    map.insert(
      "server.index".to_string(),
      DEFAULT_INDEX.to_string()
    );
    map.insert(
      "notice.duration_ms".to_string(),
      DEFAULT_NOTICE_DURATION
        .as_millis()
        .to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(todorc = %path.display(), "loading todorc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no todorc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn listen_addr(
    &self
  ) -> anyhow::Result<SocketAddr> {
    let raw = self
      .get("server.listen")
      .unwrap_or_else(|| {
        DEFAULT_LISTEN.to_string()
      });
    raw.trim().parse().with_context(
      || {
        format!(
          "invalid server.listen \
           address: {raw}"
        )
      }
    )
  }

  pub fn web_root(&self) -> PathBuf {
    let raw = self
      .get("server.root")
      .unwrap_or_else(|| {
        DEFAULT_WEB_ROOT.to_string()
      });
    expand_tilde(Path::new(&raw))
  }

  pub fn index_document(
    &self
  ) -> anyhow::Result<String> {
    let raw = self
      .get("server.index")
      .unwrap_or_else(|| {
        DEFAULT_INDEX.to_string()
      });
    let name = raw.trim();
    if name.is_empty()
      || name.contains('/')
      || name.contains('\\')
      || name == ".."
    {
      return Err(anyhow!(
        "server.index must be a plain \
         file name, got: {raw}"
      ));
    }
    Ok(name.to_string())
  }

  pub fn notice_duration(
    &self
  ) -> anyhow::Result<Duration> {
    let Some(raw) =
      self.get("notice.duration_ms")
    else {
      return Ok(
        DEFAULT_NOTICE_DURATION
      );
    };
    let millis = raw
      .trim()
      .parse::<u64>()
      .with_context(|| {
        format!(
          "invalid \
           notice.duration_ms: {raw}"
        )
      })?;
    Ok(Duration::from_millis(millis))
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if self
          .loaded_files
          .contains(&include_path)
        {
          return Err(anyhow!(
            "include cycle at {}:{}",
            path.display(),
            line_num + 1
          ));
        }
        self.load_file(&include_path)?;
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  if let Some(path) = override_dir {
    return Ok(path.to_path_buf());
  }
  if let Some(cfg_value) =
    cfg.get("data.location")
  {
    return Ok(expand_tilde(
      Path::new(&cfg_value)
    ));
  }
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".todo"))
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TODORC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    return Ok(None);
  };
  let candidate = home.join(".todorc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
