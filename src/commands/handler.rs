//! Command Handlers
//!
//! One handler per verb. Every handler receives the tokenized arguments
//! (verb excluded) and returns a [`Reply`]: a numeric status for in-process
//! callers plus the sigil-prefixed text that goes on the wire.
//!
//! ## Reply grammar
//!
//! - `+…` success text (`+OK`, `+PONG`)
//! - `-ERR …` client or internal error
//! - `:n` integer result
//! - `(nil)` missing key / empty result
//! - anything else: a raw payload (a value, a JSON dump, the STATS block)
//!
//! ## Status codes
//!
//! 200 ok, 400 bad request, 404 missing key or empty result, 500 internal
//! (stored document fails to parse, worker blew up). On the wire only the
//! text survives; the code is for tests and embedding callers.
//!
//! ## Locking discipline
//!
//! Mutating handlers take the store lock exclusively, mutate, then run
//! [`StoreEngine::commit`] which enforces the memory limit, bumps the dirty
//! counter, and flushes inline when the batch size is 0. Read verbs that
//! must record an LRU touch (`GET`, `JSON.GET`, `JSON.SEARCH`) read under
//! the shared lock, release it, then re-acquire exclusively for the touch:
//! the lock does not support upgrading, and the key may vanish in between,
//! in which case they report the miss.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::commands::json;
use crate::config::STRESS_DB_FILENAME;
use crate::fmt::{format_duration, format_memory_size};
use crate::storage::engine::{now_ms, StoreEngine};

/// Status + reply text produced by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// 200 ok, 400 bad request, 404 missing, 500 internal
    pub status: u16,
    /// Sigil-prefixed reply text
    pub text: String,
}

impl Reply {
    /// Plain `+OK`.
    pub fn ok() -> Self {
        Self {
            status: 200,
            text: "+OK".to_string(),
        }
    }

    /// A 200 with custom text (success messages, raw payloads, dumps).
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            status: 200,
            text: text.into(),
        }
    }

    /// Integer reply, `:n`.
    pub fn int(n: i64) -> Self {
        Self {
            status: 200,
            text: format!(":{}", n),
        }
    }

    /// The `(nil)` literal for a missing key.
    pub fn nil() -> Self {
        Self {
            status: 404,
            text: "(nil)".to_string(),
        }
    }

    /// A 404 with custom text (empty WHERE result).
    pub fn not_found(text: impl Into<String>) -> Self {
        Self {
            status: 404,
            text: text.into(),
        }
    }

    /// Client error, `-ERR …`.
    pub fn bad(msg: impl AsRef<str>) -> Self {
        Self {
            status: 400,
            text: format!("-ERR {}", msg.as_ref()),
        }
    }

    /// Internal error, `-ERR …`.
    pub fn internal(msg: impl AsRef<str>) -> Self {
        Self {
            status: 500,
            text: format!("-ERR {}", msg.as_ref()),
        }
    }
}

fn dump_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn dump_compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Executes commands against a shared [`StoreEngine`].
#[derive(Debug, Clone)]
pub struct CommandHandler {
    engine: Arc<StoreEngine>,
}

impl CommandHandler {
    /// Creates a handler over the given engine.
    pub fn new(engine: Arc<StoreEngine>) -> Self {
        Self { engine }
    }

    /// The engine this handler operates on.
    pub fn engine(&self) -> &Arc<StoreEngine> {
        &self.engine
    }

    /// Looks up the verb in the dispatch table and runs its handler.
    /// `PING` and `QUIT` never get here; the session short-circuits them.
    pub fn execute(&self, verb: &str, args: &[String]) -> Reply {
        match verb.to_ascii_uppercase().as_str() {
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "UPDATE" => self.cmd_update(args),
            "DEL" => self.cmd_del(args),
            "INCR" => self.cmd_incr_decr(args, true),
            "DECR" => self.cmd_incr_decr(args, false),
            "TTL" => self.cmd_ttl(args),
            "EXPIRE" => self.cmd_expire(args),
            "JSON.SET" => self.cmd_json_set(args),
            "JSON.GET" => self.cmd_json_get(args),
            "JSON.UPDATE" => self.cmd_json_update(args),
            "JSON.DEL" => self.cmd_json_del(args),
            "JSON.APPEND" => self.cmd_json_append(args),
            "JSON.SEARCH" => self.cmd_json_search(args),
            "STATS" => self.cmd_stats(args),
            "BATCH" => self.cmd_batch(args),
            "DEBUG" => self.cmd_debug(args),
            "STRESS" => self.cmd_stress(args),
            "CLRDB" => self.cmd_clrdb(args),
            "SIMILAR" => self.cmd_similar(args),
            other => Reply::bad(format!("unknown command '{}'", other)),
        }
    }

    // ========================================================================
    // String commands
    // ========================================================================

    /// SET key value [EX seconds]
    fn cmd_set(&self, args: &[String]) -> Reply {
        if args.len() != 2 && args.len() != 4 {
            return Reply::bad(
                "wrong number of arguments for 'SET'. Expected: SET <key> \"<value>\" [EX <seconds>]",
            );
        }
        let deadline = if args.len() == 4 {
            if !args[2].eq_ignore_ascii_case("EX") {
                return Reply::bad("syntax error. Expected: SET <key> \"<value>\" [EX <seconds>]");
            }
            match args[3].parse::<i64>() {
                Ok(secs) => Some(now_ms() + secs.saturating_mul(1000)),
                Err(_) => return Reply::bad("value is not an integer"),
            }
        } else {
            None
        };

        let mut store = self.engine.write();
        store.insert(&args[0], args[1].clone());
        match deadline {
            Some(d) => store.set_deadline(&args[0], d),
            None => store.clear_deadline(&args[0]),
        }
        self.engine.commit(&mut store, 1);
        Reply::ok()
    }

    /// GET key. Blind to expiry; stale keys stay visible until the sweep.
    fn cmd_get(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("wrong number of arguments");
        }
        let key = &args[0];
        let value = {
            let store = self.engine.read();
            match store.get(key) {
                Some(v) => v.to_string(),
                None => return Reply::nil(),
            }
        };
        {
            let mut store = self.engine.write();
            if !store.contains(key) {
                return Reply::nil();
            }
            store.touch(key);
        }
        Reply::raw(value)
    }

    /// UPDATE key value. Like SET but the key must already exist, and any
    /// existing expiry is left alone.
    fn cmd_update(&self, args: &[String]) -> Reply {
        if args.len() != 2 {
            return Reply::bad(
                "wrong number of arguments for 'UPDATE'. Expected: UPDATE <key> \"<value>\"",
            );
        }
        let mut store = self.engine.write();
        if !store.contains(&args[0]) {
            return Reply::nil();
        }
        store.insert(&args[0], args[1].clone());
        self.engine.commit(&mut store, 1);
        Reply::ok()
    }

    /// DEL key [key …] returns the number actually removed; 0 is fine.
    fn cmd_del(&self, args: &[String]) -> Reply {
        if args.is_empty() {
            return Reply::bad("wrong number of arguments");
        }
        let mut store = self.engine.write();
        let mut deleted = 0u64;
        for key in args {
            if store.remove(key) {
                deleted += 1;
            }
        }
        if deleted > 0 {
            self.engine.commit(&mut store, deleted);
        }
        Reply::int(deleted as i64)
    }

    /// INCR/DECR key [amount]. A missing key counts from zero.
    fn cmd_incr_decr(&self, args: &[String], is_incr: bool) -> Reply {
        if args.is_empty() || args.len() > 2 {
            return Reply::bad("wrong number of arguments");
        }
        let amount = match args.get(1) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => n,
                Err(_) => return Reply::bad("not an integer"),
            },
            None => 1,
        };
        let amount = if is_incr {
            amount
        } else {
            match amount.checked_neg() {
                Some(n) => n,
                None => return Reply::bad("increment or decrement would overflow"),
            }
        };

        let mut store = self.engine.write();
        let key = &args[0];
        let current = match store.get(key) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => n,
                Err(_) => return Reply::bad("value is not an integer"),
            },
            None => 0,
        };
        let next = match current.checked_add(amount) {
            Some(n) => n,
            None => return Reply::bad("increment or decrement would overflow"),
        };
        store.insert(key, next.to_string());
        self.engine.commit(&mut store, 1);
        Reply::int(next)
    }

    /// TTL key. The one verb that does a request-time deadline check.
    fn cmd_ttl(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("wrong number of arguments");
        }
        let store = self.engine.read();
        if !store.contains(&args[0]) {
            return Reply::nil();
        }
        match store.deadline(&args[0]) {
            None => Reply::int(-1),
            Some(deadline) => {
                let now = now_ms();
                if now > deadline {
                    Reply::nil()
                } else {
                    Reply::int((deadline - now) / 1000)
                }
            }
        }
    }

    /// EXPIRE key seconds. `s <= 0` removes the expiry, `s > 0` sets an
    /// absolute deadline `now + s` seconds out.
    fn cmd_expire(&self, args: &[String]) -> Reply {
        if args.len() != 2 {
            return Reply::bad("wrong number of arguments");
        }
        let mut store = self.engine.write();
        if !store.contains(&args[0]) {
            return Reply::nil();
        }
        match args[1].parse::<i64>() {
            Ok(secs) if secs <= 0 => store.clear_deadline(&args[0]),
            Ok(secs) => store.set_deadline(&args[0], now_ms() + secs.saturating_mul(1000)),
            Err(_) => return Reply::bad("invalid TTL value"),
        }
        self.engine.commit(&mut store, 1);
        Reply::ok()
    }

    // ========================================================================
    // JSON commands
    // ========================================================================

    /// JSON.SET key value [EX seconds]. Validates the JSON, then stores its
    /// canonical serialization through the SET path.
    fn cmd_json_set(&self, args: &[String]) -> Reply {
        if args.len() != 2 && args.len() != 4 {
            return Reply::bad(
                "wrong number of arguments for 'JSON.SET'. Expected: JSON.SET <key> '<value>' [EX <seconds>]",
            );
        }
        let doc: Value = match serde_json::from_str(&args[1]) {
            Ok(doc) => doc,
            Err(e) => return Reply::bad(format!("invalid JSON: {}", e)),
        };
        let mut set_args = vec![args[0].clone(), dump_compact(&doc)];
        if args.len() == 4 {
            set_args.push(args[2].clone());
            set_args.push(args[3].clone());
        }
        self.cmd_set(&set_args)
    }

    /// JSON.GET key [path …] | JSON.GET key WHERE field value
    fn cmd_json_get(&self, args: &[String]) -> Reply {
        if args.is_empty() {
            return Reply::bad("wrong number of arguments");
        }
        let key = &args[0];
        let dump = {
            let store = self.engine.read();
            let raw = match store.get(key) {
                Some(raw) => raw,
                None => return Reply::nil(),
            };
            let doc: Value = match serde_json::from_str(raw) {
                Ok(doc) => doc,
                Err(_) => return Reply::internal("not a valid JSON document"),
            };

            if let Some(where_pos) = args.iter().position(|a| a == "WHERE") {
                if args.len() - where_pos != 3 {
                    return Reply::bad("syntax: ... WHERE <field> <value>");
                }
                let items = match doc.as_array() {
                    Some(items) => items,
                    None => {
                        return Reply::bad("`WHERE` clause can only be used on JSON arrays.")
                    }
                };
                let field = &args[where_pos + 1];
                let needle = json::parse_literal(&args[where_pos + 2]);
                let matches: Vec<Value> = items
                    .iter()
                    .filter(|item| json::matches_where(item, field, &needle))
                    .cloned()
                    .collect();
                if matches.is_empty() {
                    return Reply::not_found("[]");
                }
                dump_pretty(&Value::Array(matches))
            } else if args.len() > 1 {
                // each requested path becomes a member; missing paths map to
                // null, indistinguishable from an explicit null in the doc
                let mut result = serde_json::Map::new();
                for path in &args[1..] {
                    let resolved = doc
                        .pointer(&json::to_pointer(path))
                        .cloned()
                        .unwrap_or(Value::Null);
                    result.insert(json::display_key(path).to_string(), resolved);
                }
                dump_pretty(&Value::Object(result))
            } else {
                dump_pretty(&doc)
            }
        };
        {
            let mut store = self.engine.write();
            if !store.contains(key) {
                return Reply::nil();
            }
            store.touch(key);
        }
        Reply::raw(dump)
    }

    /// JSON.UPDATE key WHERE field value SET f1 v1 [f2 v2 …]
    fn cmd_json_update(&self, args: &[String]) -> Reply {
        if args.len() < 4 {
            return Reply::bad("invalid syntax for JSON.UPDATE");
        }
        let where_pos = args.iter().position(|a| a == "WHERE");
        let set_pos = args.iter().position(|a| a == "SET");
        let (where_pos, set_pos) = match (where_pos, set_pos) {
            (Some(w), Some(s)) if s > w && s - w == 3 => (w, s),
            _ => return Reply::bad("syntax error. Expected: ... WHERE <field> <value> SET ..."),
        };
        let pairs = &args[set_pos + 1..];
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Reply::bad("syntax error. Expected: ... SET <field1> <value1> ...");
        }
        let key = &args[0];
        let field = &args[where_pos + 1];
        let needle = json::parse_literal(&args[where_pos + 2]);

        let mut store = self.engine.write();
        let raw = match store.get(key) {
            Some(raw) => raw.to_string(),
            None => return Reply::nil(),
        };
        let mut doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(_) => return Reply::internal("not a valid JSON document"),
        };
        let items = match doc.as_array_mut() {
            Some(items) => items,
            None => return Reply::bad("`WHERE` clause can only be used on JSON arrays."),
        };

        let mut updated = 0i64;
        for item in items.iter_mut() {
            if !json::matches_where(item, field, &needle) {
                continue;
            }
            if let Some(obj) = item.as_object_mut() {
                for pair in pairs.chunks(2) {
                    obj.insert(pair[0].clone(), json::parse_literal(&pair[1]));
                }
            }
            updated += 1;
        }
        if updated == 0 {
            return Reply::int(0);
        }
        store.insert(key, dump_compact(&doc));
        self.engine.commit(&mut store, 1);
        Reply::int(updated)
    }

    /// JSON.DEL key [WHERE field value]. The bare form deletes the key,
    /// the WHERE form filters array elements.
    fn cmd_json_del(&self, args: &[String]) -> Reply {
        if args.is_empty() {
            return Reply::bad("wrong number of arguments");
        }
        if args.len() == 1 {
            return self.cmd_del(args);
        }
        if args.len() != 4 || args[1] != "WHERE" {
            return Reply::bad("syntax: JSON.DEL <key> [WHERE <field> <value>]");
        }
        let key = &args[0];
        let field = &args[2];
        let needle = json::parse_literal(&args[3]);

        let mut store = self.engine.write();
        let raw = match store.get(key) {
            Some(raw) => raw.to_string(),
            None => return Reply::nil(),
        };
        let mut doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(_) => return Reply::internal("not a valid JSON document"),
        };
        let items = match doc.as_array_mut() {
            Some(items) => items,
            None => return Reply::bad("WHERE clause can only be used on JSON arrays."),
        };

        let before = items.len();
        items.retain(|item| !json::matches_where(item, field, &needle));
        let deleted = (before - items.len()) as i64;
        if deleted == 0 {
            return Reply::int(0);
        }
        store.insert(key, dump_compact(&doc));
        self.engine.commit(&mut store, 1);
        Reply::int(deleted)
    }

    /// JSON.APPEND key value. The stored document must be an array; an
    /// object value pushes one element, an array value extends.
    fn cmd_json_append(&self, args: &[String]) -> Reply {
        if args.len() != 2 {
            return Reply::bad(
                "wrong number of arguments. Syntax: JSON.APPEND <key> '<json_to_append>'",
            );
        }
        let key = &args[0];
        let mut store = self.engine.write();
        let raw = match store.get(key) {
            Some(raw) => raw.to_string(),
            None => return Reply::nil(),
        };
        let mut doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(_) => return Reply::internal("value at key is not a valid JSON document"),
        };
        let items = match doc.as_array_mut() {
            Some(items) => items,
            None => return Reply::bad("APPEND requires the value at key to be a JSON array"),
        };
        let addition: Value = match serde_json::from_str(&args[1]) {
            Ok(v) => v,
            Err(e) => return Reply::bad(format!("invalid JSON for append: {}", e)),
        };
        match addition {
            Value::Object(_) => items.push(addition),
            Value::Array(mut more) => items.append(&mut more),
            _ => return Reply::bad("append value must be a JSON object or array"),
        }
        let new_len = items.len() as i64;
        store.insert(key, dump_compact(&doc));
        self.engine.commit(&mut store, 1);
        Reply::int(new_len)
    }

    /// JSON.SEARCH key term [MAX n]. Recursive whole-word search. An array
    /// root is filtered element by element; any other root matches (or not)
    /// as a whole and is wrapped in a one-element array.
    fn cmd_json_search(&self, args: &[String]) -> Reply {
        if args.len() != 2 && args.len() != 4 {
            return Reply::bad("syntax: JSON.SEARCH <key> \"<term>\" [MAX <count>]");
        }
        let key = &args[0];
        let term = &args[1];
        if term.is_empty() {
            return Reply::bad("search term cannot be empty");
        }
        let max_results = if args.len() == 4 {
            if !args[2].eq_ignore_ascii_case("MAX") {
                return Reply::bad("expected MAX keyword after term");
            }
            match args[3].parse::<i64>() {
                Ok(count) if count > 0 => count as usize,
                Ok(_) => return Reply::bad("MAX count must be a positive integer"),
                Err(_) => return Reply::bad("invalid number for MAX count"),
            }
        } else {
            usize::MAX
        };

        let dump = {
            let store = self.engine.read();
            let raw = match store.get(key) {
                Some(raw) => raw,
                None => return Reply::nil(),
            };
            let doc: Value = match serde_json::from_str(raw) {
                Ok(doc) => doc,
                Err(_) => return Reply::internal("not a valid JSON document"),
            };

            let mut results = Vec::new();
            match &doc {
                Value::Array(items) => {
                    for item in items {
                        if results.len() >= max_results {
                            break;
                        }
                        if json::contains_word(item, term) {
                            results.push(item.clone());
                        }
                    }
                }
                other => {
                    if json::contains_word(other, term) {
                        results.push(other.clone());
                    }
                }
            }
            if results.is_empty() {
                return Reply::nil();
            }
            dump_pretty(&Value::Array(results))
        };
        {
            let mut store = self.engine.write();
            if !store.contains(key) {
                return Reply::nil();
            }
            store.touch(key);
        }
        Reply::raw(dump)
    }

    // ========================================================================
    // Operational commands
    // ========================================================================

    /// STATS returns a multi-line report of configuration and store state.
    fn cmd_stats(&self, _args: &[String]) -> Reply {
        let settings = self.engine.settings();
        let store = self.engine.read();

        let mut out = String::new();
        out.push_str(&format!("Version: NukeKV v{}\n", env!("CARGO_PKG_VERSION")));
        out.push_str("Protocol: Nuke-Wire (framed TCP)\n");
        out.push_str(&format!(
            "Debug Mode: {}\n",
            if settings.debug() { "ON" } else { "OFF" }
        ));
        out.push_str(&format!("Worker Threads: {}\n", settings.workers));
        out.push_str("-------------------------\n");
        out.push_str(&format!(
            "Persistence Disk: {}\n",
            if settings.persistence {
                "Enabled"
            } else {
                "Disabled"
            }
        ));
        if settings.persistence {
            out.push_str(&format!("  - Batch Size: {}\n", settings.batch_size()));
            out.push_str(&format!("  - Unsaved Ops: {}\n", store.dirty()));
            let disk = std::fs::metadata(&settings.db_path)
                .map(|m| format_memory_size(m.len()))
                .unwrap_or_else(|_| "N/A".to_string());
            out.push_str(&format!("  - Disk Size: {}\n", disk));
        }
        out.push_str("-------------------------\n");
        out.push_str(&format!(
            "Caching: {}\n",
            if settings.caching { "Enabled" } else { "Disabled" }
        ));
        if settings.caching {
            let limit = if settings.memory_limit > 0 {
                format_memory_size(settings.memory_limit)
            } else {
                "Unlimited".to_string()
            };
            out.push_str(&format!("  - Memory Limit: {}\n", limit));
            out.push_str(&format!(
                "  - Memory Used: {}\n",
                format_memory_size(store.mem_used())
            ));
        }
        out.push_str("-------------------------\n");
        out.push_str(&format!("Total Keys: {}\n", store.len()));
        out.push_str(&format!("Keys with TTL: {}\n", store.ttl_len()));
        out.push_str("-------------------------");
        Reply::raw(out)
    }

    /// BATCH n. A size of 0 means flush every mutation inline.
    fn cmd_batch(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("BATCH requires one argument");
        }
        let size = match args[0].parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Reply::bad("value is not an integer"),
        };
        if size < 0 {
            return Reply::bad("batch size cannot be negative");
        }
        self.engine.settings().set_batch_size(size as u32);
        Reply::ok()
    }

    /// DEBUG true|false
    fn cmd_debug(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("DEBUG requires one argument");
        }
        match args[0].to_ascii_lowercase().as_str() {
            "true" => {
                self.engine.settings().set_debug(true);
                Reply::raw("+OK Debug mode enabled.")
            }
            "false" => {
                self.engine.settings().set_debug(false);
                Reply::raw("+OK Debug mode disabled.")
            }
            _ => Reply::bad("Invalid argument. Use 'true' or 'false'."),
        }
    }

    /// STRESS n. Benchmarks SET, UPDATE, GET, DEL through the real
    /// handlers, then snapshots to the scratch file (which never resets the
    /// dirty counter) and removes it.
    fn cmd_stress(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("STRESS requires exactly one argument (e.g., STRESS 1000)");
        }
        let count: usize = match args[0].parse::<i64>() {
            Ok(n) if n > 0 => n as usize,
            Ok(_) => return Reply::bad("count must be positive"),
            Err(_) => return Reply::bad("invalid number for count"),
        };
        info!(count, "starting stress test");

        let overall = Instant::now();
        let keys: Vec<String> = (0..count).map(|i| format!("stress:{}", i)).collect();
        let mut peak_mem = 0u64;
        let mut report = format!(
            "Stress Test running for {} ops...\n-------------------------------------------",
            count
        );

        let mut bench = |label: &str, op: &mut dyn FnMut(&String)| {
            let start = Instant::now();
            for key in &keys {
                op(key);
            }
            let elapsed = start.elapsed();
            peak_mem = peak_mem.max(self.engine.read().mem_used());
            report.push_str(&format!(
                "\n{:<8}{:>12.2} ops/sec ({} total)",
                label,
                count as f64 / elapsed.as_secs_f64(),
                format_duration(elapsed)
            ));
        };

        bench("SET:", &mut |key| {
            self.cmd_set(&[key.clone(), "svalue".to_string()]);
        });
        bench("UPDATE:", &mut |key| {
            self.cmd_update(&[key.clone(), "nvalue".to_string()]);
        });
        bench("GET:", &mut |key| {
            self.cmd_get(&[key.clone()]);
        });
        bench("DEL:", &mut |key| {
            self.cmd_del(std::slice::from_ref(key));
        });

        {
            let mut store = self.engine.write();
            self.engine.flush(&mut store, Path::new(STRESS_DB_FILENAME));
        }
        let _ = std::fs::remove_file(STRESS_DB_FILENAME);

        report.push_str(&format!(
            "\n-------------------------------------------\nPeak Memory Estimate: {}\nTotal Stress Test Time: {}",
            format_memory_size(peak_mem),
            format_duration(overall.elapsed())
        ));
        info!("stress test complete, all test data disposed");
        Reply::raw(report)
    }

    /// CLRDB drops every key.
    fn cmd_clrdb(&self, _args: &[String]) -> Reply {
        let mut store = self.engine.write();
        let cleared = store.clear();
        self.engine.commit(&mut store, 1);
        Reply::raw(format!("+OK {} keys cleared.", cleared))
    }

    /// SIMILAR prefix counts keys with the given prefix.
    fn cmd_similar(&self, args: &[String]) -> Reply {
        if args.len() != 1 {
            return Reply::bad("wrong number of arguments, expected: SIMILAR <prefix>");
        }
        if args[0].is_empty() {
            return Reply::bad("prefix cannot be empty");
        }
        let store = self.engine.read();
        Reply::int(store.count_prefix(&args[0]) as i64)
    }
}
