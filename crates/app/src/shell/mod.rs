//! Interactive shell over the reconciliation engine.
//!
//! Reads one command per line and writes tables and messages to the given
//! writer. Engine refusals are shown to the user and the session carries on;
//! only failures of the output itself end the shell.

use std::{
    error::Error as StdError,
    io::{self, Write},
    path::PathBuf,
};

use rusty_money::iso::Currency;
use storefront::{
    engine::{CheckoutSummary, ReconciliationEngine},
    receipt::ReceiptError,
    remote::InventoryRemote,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

mod command;
mod render;

pub use command::{Command, CommandError};
pub use render::{cart_table, catalog_table, search};

const HELP: &str = "\
Commands:
  list                   show the catalog
  search <term>          find products by name
  add <product-id>       add one unit to the cart
  remove <cart-position> remove an entry from the cart
  cart                   show the cart
  checkout <name>        buy the cart
  refresh                reload the catalog
  help                   show this list
  quit                   leave";

/// Errors that end the shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Reading input or writing output failed.
    #[error("shell i/o failed")]
    Io(#[from] io::Error),

    /// An amount could not be formatted.
    #[error("failed to render amounts")]
    Render(#[from] ReceiptError),
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,

    /// Stop.
    Quit,
}

/// Display and output settings.
#[derive(Debug, Clone)]
pub struct ShellSettings {
    /// Currency prices are shown in.
    pub currency: &'static Currency,

    /// Where receipts are saved.
    pub receipt_dir: PathBuf,
}

/// Line-oriented storefront session.
#[derive(Debug)]
pub struct Shell<'a, R, W> {
    engine: &'a ReconciliationEngine<R>,
    out: W,
    settings: ShellSettings,
}

impl<'a, R: InventoryRemote, W: Write> Shell<'a, R, W> {
    /// Create a shell writing to `out`.
    pub fn new(engine: &'a ReconciliationEngine<R>, out: W, settings: ShellSettings) -> Self {
        Self {
            engine,
            out,
            settings,
        }
    }

    /// Consume the shell, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Read commands until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] if input cannot be read or output cannot be
    /// written.
    pub async fn run<I>(&mut self, input: I) -> Result<(), ShellError>
    where
        I: AsyncBufRead + Unpin,
    {
        writeln!(self.out, "Type `help` for a list of commands.")?;

        let mut lines = input.lines();

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            if self.execute(&line).await? == Flow::Quit {
                break;
            }
        }

        Ok(())
    }

    /// Parse and run one line.
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] if output cannot be written.
    pub async fn execute(&mut self, line: &str) -> Result<Flow, ShellError> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                writeln!(self.out, "{error}")?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Empty => {}
            Command::List => self.list()?,
            Command::Search(term) => self.search(&term)?,
            Command::Add(product_id) => self.add(&product_id).await?,
            Command::Remove(position) => self.remove(position.get())?,
            Command::Cart => self.cart()?,
            Command::Checkout(buyer) => self.checkout(&buyer).await?,
            Command::Refresh => self.refresh().await?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn list(&mut self) -> Result<(), ShellError> {
        let products = self.engine.products();

        if products.is_empty() {
            writeln!(self.out, "The catalog is empty.")?;
        } else {
            writeln!(self.out, "{}", catalog_table(&products, self.settings.currency)?)?;
        }

        Ok(())
    }

    fn search(&mut self, term: &str) -> Result<(), ShellError> {
        let products = self.engine.products();
        let found = search(&products, term);

        if found.is_empty() {
            writeln!(self.out, "No products found.")?;
        } else {
            writeln!(self.out, "{}", catalog_table(found, self.settings.currency)?)?;
        }

        Ok(())
    }

    async fn add(&mut self, product_id: &str) -> Result<(), ShellError> {
        match self.engine.add_to_cart(product_id).await {
            Ok(entry) => writeln!(
                self.out,
                "Added {} to the cart ({} items).",
                entry.name(),
                self.engine.cart_entries().len()
            )?,
            Err(refusal) => writeln!(self.out, "Could not add: {}", describe(&refusal))?,
        }

        Ok(())
    }

    fn remove(&mut self, position: usize) -> Result<(), ShellError> {
        let entries = self.engine.cart_entries();

        let Some(entry) = position.checked_sub(1).and_then(|index| entries.get(index)) else {
            writeln!(self.out, "There is no item {position} in the cart.")?;
            return Ok(());
        };

        match self.engine.remove_from_cart(entry.id()) {
            Ok(removed) => writeln!(self.out, "Removed {} from the cart.", removed.name())?,
            Err(refusal) => writeln!(self.out, "Could not remove: {}", describe(&refusal))?,
        }

        Ok(())
    }

    fn cart(&mut self) -> Result<(), ShellError> {
        let entries = self.engine.cart_entries();

        if entries.is_empty() {
            writeln!(self.out, "The cart is empty.")?;
            return Ok(());
        }

        let table = cart_table(
            &entries,
            self.engine.cart_total(),
            self.engine.points_total(),
            self.settings.currency,
        )?;

        writeln!(self.out, "{table}")?;

        Ok(())
    }

    async fn checkout(&mut self, buyer: &str) -> Result<(), ShellError> {
        match self.engine.checkout(buyer).await {
            Ok(summary) => self.complete_checkout(summary).await,
            Err(refusal) => {
                writeln!(self.out, "Checkout failed: {}", describe(&refusal))?;
                Ok(())
            }
        }
    }

    async fn complete_checkout(&mut self, summary: CheckoutSummary) -> Result<(), ShellError> {
        let rendered = summary.receipt.render(self.settings.currency)?;

        writeln!(self.out, "Purchase complete.\n\n{rendered}")?;

        let path = self.settings.receipt_dir.join(summary.receipt.file_name());

        match tokio::fs::write(&path, rendered.as_bytes()).await {
            Ok(()) => {
                info!(path = %path.display(), "receipt saved");
                writeln!(self.out, "Receipt saved to {}.", path.display())?;
            }
            Err(write_error) => {
                error!(path = %path.display(), error = %write_error, "failed to save receipt");
                writeln!(self.out, "Could not save the receipt: {write_error}")?;
            }
        }

        if !summary.snapshot_refreshed && self.engine.policy().commits_on_checkout() {
            writeln!(
                self.out,
                "The catalog could not be refreshed; stock shown may be out of date."
            )?;
        }

        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), ShellError> {
        match self.engine.load().await {
            Ok(count) => writeln!(self.out, "Loaded {count} products.")?,
            Err(failure) => writeln!(
                self.out,
                "Could not load products: {}",
                describe(&failure)
            )?,
        }

        Ok(())
    }
}

/// An error and its sources on one line.
pub fn describe(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
