//! Key/value and set storage backing the ability engine.
//!
//! A store is a collection of named maps (`String` keys, JSON values) and
//! named sets (`String` members). Writes happen in memory and become durable
//! on [`Store::commit`].

pub mod error;
pub mod file;
pub mod tables;

pub use {
    error::{Error, Result},
    file::FileStore,
    tables::Tables,
};

/// Storage contract used by the dispatch engine.
///
/// `read` and `write` run the closure while holding the store's lock, so a
/// single `write` call is atomic with respect to every other access.
pub trait Store: Send + Sync {
    fn read(&self, f: &mut dyn FnMut(&Tables)) -> Result<()>;

    fn write(&self, f: &mut dyn FnMut(&mut Tables)) -> Result<()>;

    /// Make all writes so far durable.
    fn commit(&self) -> Result<()>;

    /// Serialize the full contents into an opaque blob.
    fn backup(&self) -> Result<String>;

    /// Replace the contents with a blob produced by [`Store::backup`] and commit.
    fn recover(&self, backup: &str) -> Result<()>;

    /// Drop every map and set, then commit.
    fn clear(&self) -> Result<()>;
}

/// Value-returning helpers over [`Store::read`] and [`Store::write`].
pub trait StoreExt: Store {
    fn view<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        self.read(&mut |tables| {
            if let Some(f) = f.take() {
                out = Some(f(tables));
            }
        })?;
        out.ok_or_else(|| Error::message("store read closure did not run"))
    }

    fn update<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        self.write(&mut |tables| {
            if let Some(f) = f.take() {
                out = Some(f(tables));
            }
        })?;
        out.ok_or_else(|| Error::message("store write closure did not run"))
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
