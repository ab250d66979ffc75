//! Line-delimited JSON command loop.
//!
//! Each request is `{"id": .., "cmd": "..", "payload": {..}}` and gets exactly
//! one response line. Loaded catalogs live in the [`Session`] until they are
//! unloaded or the process exits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::model::catalog::Catalog;
use crate::model::config::CoreConfig;
use crate::model::entry::UnfinishedPolicy;
use crate::services::{coverage, encoding, fingerprint, loader, placeholder, qa, resolve, writer};

mod command;
use command::Command;

// key for catalogs whose <TS> carries no language attribute
const UNNAMED: &str = "default";

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str())
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

pub struct Session {
    config: CoreConfig,
    catalogs: HashMap<String, Arc<Catalog>>,
    active: Option<String>,
}

impl Session {
    pub fn new(config: CoreConfig) -> Self {
        Session {
            config,
            catalogs: HashMap::new(),
            active: None,
        }
    }

    /// Loads the configured default locale, if there is one.
    pub fn preload(&mut self) -> Result<(), String> {
        let locale = self.config.default_locale.trim().to_string();
        if locale.is_empty() {
            return Ok(());
        }
        self.load_locale(&locale).map(|_| ())
    }

    pub fn active(&self) -> Option<Arc<Catalog>> {
        self.active
            .as_ref()
            .and_then(|key| self.catalogs.get(key))
            .cloned()
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        debug!(cmd = cmd_str, "request");

        let result = match Command::from(cmd_str) {
            Command::Ping => Ok(json!({ "message": "linguist-core alive" })),
            Command::CatalogLoad => self.cmd_load(payload),
            Command::CatalogLoadLocale => self.cmd_load_locale(payload),
            Command::CatalogSwitch => self.cmd_switch(payload),
            Command::CatalogUnload => self.cmd_unload(payload),
            Command::CatalogEntries => self
                .catalog_for(payload)
                .map(|c| json!({ "contexts": c.contexts() })),
            Command::CatalogWrite => self.cmd_write(payload),
            Command::Translate => self.cmd_translate(payload),
            Command::RunQa => self
                .catalog_for(payload)
                .map(|c| json!({ "issues": qa::run(&c) })),
            Command::Coverage => self
                .catalog_for(payload)
                .map(|c| serde_json::to_value(coverage::report(&c)).unwrap_or(json!({}))),
            Command::DetectEncoding => cmd_detect_encoding(payload),
            Command::Unknown => Err("unknown command".to_string()),
        };

        match result {
            Ok(v) => ok(id, v),
            Err(e) => err(id, e),
        }
    }

    fn insert(&mut self, catalog: Catalog, fallback_key: &str) -> Value {
        let key = catalog
            .language()
            .filter(|l| !l.is_empty())
            .unwrap_or(fallback_key)
            .to_string();

        let summary = json!({
            "language": key,
            "contexts": catalog.contexts().len(),
            "entries": catalog.len(),
            "digest": fingerprint::fingerprint(&catalog),
        });

        // replacing a catalog drops the old one once no reader holds it
        self.catalogs.insert(key.clone(), Arc::new(catalog));
        self.active = Some(key);
        summary
    }

    fn policy_from(&self, payload: &Value) -> Result<UnfinishedPolicy, String> {
        match payload.get("unfinished_policy") {
            None | Some(Value::Null) => Ok(self.config.unfinished_policy),
            Some(v) => serde_json::from_value::<UnfinishedPolicy>(v.clone())
                .map_err(|e| format!("invalid payload.unfinished_policy: {e}")),
        }
    }

    fn cmd_load(&mut self, payload: &Value) -> Result<Value, String> {
        let policy = self.policy_from(payload)?;

        let catalog = match (get_str(payload, "path"), get_str(payload, "text")) {
            (Some(path), _) if !path.is_empty() => {
                loader::load_file(Path::new(path), policy).map_err(|e| e.to_string())?
            }
            (_, Some(text)) => loader::load_str(text, policy).map_err(|e| e.to_string())?,
            _ => return Err("payload.path or payload.text is required".into()),
        };

        let fallback = get_str(payload, "language").unwrap_or(UNNAMED).to_string();
        Ok(self.insert(catalog, &fallback))
    }

    fn load_locale(&mut self, locale: &str) -> Result<Value, String> {
        let dir = PathBuf::from(&self.config.translations_dir);
        let path = resolve::resolve(&dir, &self.config.catalog_name, locale)
            .ok_or_else(|| format!("no catalog for locale {locale} in {}", dir.display()))?;

        let catalog =
            loader::load_file(&path, self.config.unfinished_policy).map_err(|e| e.to_string())?;

        let mut summary = self.insert(catalog, locale);
        summary["path"] = json!(path.to_string_lossy());
        Ok(summary)
    }

    fn cmd_load_locale(&mut self, payload: &Value) -> Result<Value, String> {
        let locale = get_str(payload, "locale")
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_locale.clone());
        if locale.trim().is_empty() {
            return Err("payload.locale is required".into());
        }
        self.load_locale(locale.trim())
    }

    fn cmd_switch(&mut self, payload: &Value) -> Result<Value, String> {
        let language = get_str(payload, "language").unwrap_or("");
        if language.is_empty() {
            return Err("payload.language is required".into());
        }
        if !self.catalogs.contains_key(language) {
            return Err(format!("catalog {language} is not loaded"));
        }

        info!(language, "switched active catalog");
        self.active = Some(language.to_string());
        Ok(json!({ "language": language }))
    }

    fn cmd_unload(&mut self, payload: &Value) -> Result<Value, String> {
        let language = get_str(payload, "language").unwrap_or("");
        if language.is_empty() {
            return Err("payload.language is required".into());
        }

        let removed = self.catalogs.remove(language).is_some();
        if self.active.as_deref() == Some(language) {
            self.active = None;
        }
        Ok(json!({ "language": language, "removed": removed }))
    }

    fn catalog_for(&self, payload: &Value) -> Result<Arc<Catalog>, String> {
        match get_str(payload, "language") {
            Some(language) => self
                .catalogs
                .get(language)
                .cloned()
                .ok_or_else(|| format!("catalog {language} is not loaded")),
            None => self.active().ok_or_else(|| "no catalog loaded".to_string()),
        }
    }

    fn cmd_translate(&self, payload: &Value) -> Result<Value, String> {
        let source = get_str(payload, "source").ok_or("payload.source is required")?;
        let context = get_str(payload, "context").unwrap_or("");
        let comment = get_str(payload, "comment");

        let args: Vec<String> = match payload.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(_) => return Err("payload.args must be an array".into()),
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let catalog = match get_str(payload, "language") {
            Some(language) => self.catalogs.get(language).cloned(),
            None => self.active(),
        };

        // without a catalog the source text is still the answer
        let text = match catalog {
            Some(c) => c.translate_with_comment(context, source, comment, &args),
            None => {
                debug!(context, "translate without a loaded catalog");
                placeholder::substitute(source, &args)
            }
        };

        Ok(json!({ "text": text }))
    }

    fn cmd_write(&self, payload: &Value) -> Result<Value, String> {
        let catalog = self.catalog_for(payload)?;

        match get_str(payload, "path") {
            Some(path) if !path.is_empty() => {
                writer::save(&catalog, Path::new(path)).map_err(|e| e.to_string())?;
                Ok(json!({ "path": path }))
            }
            _ => Ok(json!({ "text": writer::write(&catalog) })),
        }
    }
}

fn cmd_detect_encoding(payload: &Value) -> Result<Value, String> {
    let path_str = get_str(payload, "path").unwrap_or("");
    if path_str.is_empty() {
        return Err("payload.path is required".into());
    }

    let result = encoding::detect_from_file(Path::new(path_str)).map_err(|e| e.to_string())?;
    Ok(serde_json::to_value(result).unwrap_or(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<TS version="2.1" language="fi"><context><name>SoundItem</name><message><source>Volume %1</source><translation>Äänitaso: %1</translation></message></context></TS>"#;

    fn call(session: &mut Session, req: Value) -> Value {
        serde_json::from_str(&session.handle(&req.to_string())).unwrap()
    }

    #[test]
    fn rejects_garbage() {
        let mut s = Session::new(CoreConfig::default());
        let resp: Value = serde_json::from_str(&s.handle("{nope")).unwrap();
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");

        let resp = call(&mut s, json!({ "id": 7, "cmd": "frobnicate" }));
        assert_eq!(resp["id"], 7);
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn load_text_then_translate() {
        let mut s = Session::new(CoreConfig::default());
        let resp = call(&mut s, json!({ "id": 1, "cmd": "catalog.load", "payload": { "text": DOC } }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["language"], "fi");
        assert_eq!(resp["payload"]["entries"], 1);

        let resp = call(
            &mut s,
            json!({ "id": 2, "cmd": "translate", "payload": { "context": "SoundItem", "source": "Volume %1", "args": [80] } }),
        );
        assert_eq!(resp["payload"]["text"], "Äänitaso: 80");
    }

    #[test]
    fn translate_without_catalog_is_identity() {
        let mut s = Session::new(CoreConfig::default());
        let resp = call(
            &mut s,
            json!({ "cmd": "translate", "payload": { "context": "TrashPlugin", "source": "Trash - %1 files", "args": ["3"] } }),
        );
        assert_eq!(resp["payload"]["text"], "Trash - 3 files");
    }

    #[test]
    fn translate_with_unloaded_language_falls_back() {
        let mut s = Session::new(CoreConfig::default());
        call(&mut s, json!({ "cmd": "catalog.load", "payload": { "text": DOC } }));

        let resp = call(
            &mut s,
            json!({ "cmd": "translate", "payload": { "context": "SoundItem", "source": "Volume %1", "args": ["80"], "language": "sv" } }),
        );
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["text"], "Volume 80");
    }

    #[test]
    fn failed_load_keeps_previous_catalog() {
        let mut s = Session::new(CoreConfig::default());
        call(&mut s, json!({ "cmd": "catalog.load", "payload": { "text": DOC } }));

        let resp = call(&mut s, json!({ "cmd": "catalog.load", "payload": { "text": "<TS><context>" } }));
        assert_eq!(resp["status"], "error");

        let active = s.active().unwrap();
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn bad_policy_is_rejected() {
        let mut s = Session::new(CoreConfig::default());
        let resp = call(
            &mut s,
            json!({ "cmd": "catalog.load", "payload": { "text": DOC, "unfinished_policy": "guess" } }),
        );
        assert_eq!(resp["status"], "error");
    }
}
