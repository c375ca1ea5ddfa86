//! Cart store and line types.

use crate::cart::{fingerprint, Fingerprint};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::money::Money;
use crate::pricing::{PricingEngine, ResolvedSelection, SelectionSet};
use serde::{Deserialize, Serialize};

/// Default maximum count per cart line.
pub const MAX_QUANTITY_PER_LINE: u32 = 999;

/// Default maximum observation length, in characters.
pub const MAX_OBSERVATION_CHARS: usize = 140;

/// Per-line limits enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLimits {
    pub max_quantity_per_line: u32,
    pub observation_max_chars: usize,
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_quantity_per_line: MAX_QUANTITY_PER_LINE,
            observation_max_chars: MAX_OBSERVATION_CHARS,
        }
    }
}

/// One configured product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line identity.
    pub fingerprint: Fingerprint,
    /// Product as it was when first added.
    pub product: Product,
    /// Selected options, frozen at add time.
    pub selection: ResolvedSelection,
    /// Trimmed free-text note.
    pub observation: String,
    /// Unit price, frozen at first add.
    pub total_price: Money,
    /// Always at least 1.
    pub count: u32,
}

impl CartLine {
    /// Unit price.
    pub fn unit_price(&self) -> Money {
        self.total_price
    }

    /// Unit price times count.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.total_price
            .try_multiply(self.count as i64)
            .ok_or(CommerceError::Overflow)
    }
}

/// Serializable cart contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
}

/// Ordered collection of cart lines, unique by fingerprint.
///
/// Not thread-safe on its own; hosts that mutate it from several tasks
/// must serialize access.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    pricing: PricingEngine,
    limits: CartLimits,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Empty cart priced with `pricing`.
    pub fn new(pricing: PricingEngine) -> Self {
        Self::with_limits(pricing, CartLimits::default())
    }

    /// Empty cart with explicit limits.
    pub fn with_limits(pricing: PricingEngine, limits: CartLimits) -> Self {
        Self {
            pricing,
            limits,
            lines: Vec::new(),
        }
    }

    /// Rebuild a cart from a snapshot.
    ///
    /// Fingerprints are recomputed from the stored selections and lines that
    /// collide are merged, keeping the first line's price.
    pub fn restore(pricing: PricingEngine, limits: CartLimits, snapshot: CartSnapshot) -> Self {
        let mut store = Self::with_limits(pricing, limits);
        for mut line in snapshot.lines {
            if line.count == 0 {
                continue;
            }
            line.fingerprint = fingerprint(&line.product, &line.observation, &line.selection);
            match store.position(&line.fingerprint) {
                Some(idx) => {
                    let existing = &mut store.lines[idx];
                    existing.count = existing
                        .count
                        .saturating_add(line.count)
                        .min(limits.max_quantity_per_line);
                    tracing::debug!(fingerprint = %existing.fingerprint, "merged colliding lines on restore");
                }
                None => {
                    line.count = line.count.min(limits.max_quantity_per_line);
                    store.lines.push(line);
                }
            }
        }
        store
    }

    /// Serializable copy of the lines.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
        }
    }

    /// The engine used to price new lines.
    pub fn pricing(&self) -> PricingEngine {
        self.pricing
    }

    /// Add `quantity` units of a configured product.
    ///
    /// A matching line has its count raised without repricing. Otherwise the
    /// selection is resolved, priced and stored as a new line.
    pub fn add(
        &mut self,
        product: &Product,
        selection: &SelectionSet,
        observation: &str,
        quantity: u32,
    ) -> Result<Fingerprint, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }
        let observation = observation.trim();
        let len = observation.chars().count();
        if len > self.limits.observation_max_chars {
            return Err(CommerceError::ObservationTooLong {
                len,
                max: self.limits.observation_max_chars,
            });
        }

        let resolved = self.pricing.resolve(product, selection)?;
        let key = fingerprint(product, observation, &resolved);
        let max = self.limits.max_quantity_per_line;

        if let Some(idx) = self.position(&key) {
            let line = &mut self.lines[idx];
            let count = line.count.checked_add(quantity).ok_or(CommerceError::Overflow)?;
            if count > max {
                return Err(CommerceError::QuantityExceedsLimit(count as i64, max as i64));
            }
            line.count = count;
            tracing::debug!(fingerprint = %key, count, "merged into existing cart line");
            return Ok(key);
        }

        if quantity > max {
            return Err(CommerceError::QuantityExceedsLimit(quantity as i64, max as i64));
        }
        let unit_price = self.pricing.price_resolved(product, &resolved)?;
        self.lines.push(CartLine {
            fingerprint: key.clone(),
            product: product.clone(),
            selection: resolved,
            observation: observation.to_string(),
            total_price: unit_price,
            count: quantity,
        });
        tracing::debug!(
            fingerprint = %key,
            product_id = %product.id,
            unit_price = %unit_price,
            count = quantity,
            "cart line created"
        );
        Ok(key)
    }

    /// Raise a line's count by one. Returns the new count.
    pub fn increment_line(&mut self, key: &Fingerprint) -> Result<u32, CommerceError> {
        let max = self.limits.max_quantity_per_line;
        let line = self.line_mut(key)?;
        let count = line.count.checked_add(1).ok_or(CommerceError::Overflow)?;
        if count > max {
            return Err(CommerceError::QuantityExceedsLimit(count as i64, max as i64));
        }
        line.count = count;
        Ok(count)
    }

    /// Lower a line's count by one, removing the line at zero.
    ///
    /// Returns the new count (0 when the line was removed).
    pub fn decrement_line(&mut self, key: &Fingerprint) -> Result<u32, CommerceError> {
        let idx = self
            .position(key)
            .ok_or_else(|| CommerceError::LineNotFound(key.to_string()))?;
        let count = self.lines[idx].count.saturating_sub(1);
        if count == 0 {
            self.lines.remove(idx);
            tracing::debug!(fingerprint = %key, "cart line removed");
        } else {
            self.lines[idx].count = count;
        }
        Ok(count)
    }

    /// Remove a line regardless of count. Returns whether it existed.
    pub fn remove_line(&mut self, key: &Fingerprint) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.fingerprint != key);
        let removed = self.lines.len() < len_before;
        if removed {
            tracing::debug!(fingerprint = %key, "cart line removed");
        }
        removed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times count over all lines.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.try_add(&line.line_total()?).ok_or(CommerceError::Overflow)
        })
    }

    /// Total units across lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.count).sum()
    }

    /// Look up a line.
    pub fn line(&self, key: &Fingerprint) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.fingerprint == key)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, key: &Fingerprint) -> Option<usize> {
        self.lines.iter().position(|l| &l.fingerprint == key)
    }

    fn line_mut(&mut self, key: &Fingerprint) -> Result<&mut CartLine, CommerceError> {
        self.lines
            .iter_mut()
            .find(|l| &l.fingerprint == key)
            .ok_or_else(|| CommerceError::LineNotFound(key.to_string()))
    }
}
