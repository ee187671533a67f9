//! Dual-input quote engine for two-sided PT/SY deposits.
//!
//! A deposit form holds two text fields: the amount of the SY's
//! yield-bearing token and the amount of PT. Editing either field derives
//! the other from the market's current exchange rate, and the parsed pair
//! determines the pool-share preview.
//!
//! Everything here is a pure function of `(market, pair, edit)`. The market
//! snapshot is read fresh on every call, so a refreshed market takes effect
//! on the next edit. Markets without pool-share supply have no rate to
//! derive from: their two fields are edited independently.

use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::error::QuoteError;
use super::snapshot::{Market, asset_to_sy};

/// Which of the two fields an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    /// Amount of the yield-bearing deposit token.
    Token,
    /// Amount of principal token.
    Pt,
}

/// The raw text of both fields, always updated together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPair {
    /// Deposit-token field.
    pub token_input: String,
    /// PT field.
    pub pt_input: String,
}

impl InputPair {
    /// Builds a pair from two field values.
    #[must_use]
    pub fn new(token_input: impl Into<String>, pt_input: impl Into<String>) -> Self {
        Self {
            token_input: token_input.into(),
            pt_input: pt_input.into(),
        }
    }

    /// Whether both fields are blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token_input.is_empty() && self.pt_input.is_empty()
    }
}

/// Classification of a pair after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    /// Both fields blank.
    Empty,
    /// Market has no pool-share supply; fields are independent.
    BootstrapEditing,
    /// One field drives, the other was derived from the rate.
    Derived,
    /// No usable pair: the driving field is not a usable amount (the other
    /// was cleared), or the derived amount rounds to zero.
    Invalid,
}

/// Result of applying one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPair {
    /// The new field values.
    pub pair: InputPair,
    /// How the pair relates to the market after the edit.
    pub state: PairState,
}

/// Both fields parsed against their token precisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPair {
    /// Deposit-token amount, if the field holds a usable amount.
    pub token: Option<Amount>,
    /// PT amount, if the field holds a usable amount.
    pub pt: Option<Amount>,
}

impl ParsedPair {
    /// Whether both amounts are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.token.is_some() && self.pt.is_some()
    }
}

/// Applies an edit of `field` to `raw_input` and derives the counterpart.
///
/// Without pool-share supply only the edited field changes. Otherwise the
/// edited text is parsed: unusable text clears the other field, a valid
/// amount is converted through the SY wrapper and the pool rate. An amount
/// too large to convert is handled like unusable text.
///
/// # Errors
///
/// Returns a [`QuoteError`] only when the snapshot cannot price a valid
/// amount (empty reserve, foreign token). Unparsable text is not an error.
pub fn derive_state(
    market: &Market,
    current: &InputPair,
    field: InputField,
    raw_input: &str,
) -> Result<DerivedPair, QuoteError> {
    if market.is_bootstrap() {
        let pair = match field {
            InputField::Token => InputPair::new(raw_input, current.pt_input.clone()),
            InputField::Pt => InputPair::new(current.token_input.clone(), raw_input),
        };
        let state = if pair.is_empty() {
            PairState::Empty
        } else {
            PairState::BootstrapEditing
        };
        return Ok(DerivedPair { pair, state });
    }

    let converted = match field {
        InputField::Token => token_to_pt(market, raw_input),
        InputField::Pt => pt_to_token(market, raw_input),
    };
    let derived = match converted {
        Err(QuoteError::ArithmeticOverflow) => None,
        other => other?,
    };
    let usable = derived.as_ref().is_some_and(|amount| !amount.is_zero());
    let counterpart = derived.map(|amount| amount.to_exact()).unwrap_or_default();
    let pair = match field {
        InputField::Token => InputPair::new(raw_input, counterpart),
        InputField::Pt => InputPair::new(counterpart, raw_input),
    };

    let state = if pair.is_empty() {
        PairState::Empty
    } else if usable {
        PairState::Derived
    } else {
        PairState::Invalid
    };
    Ok(DerivedPair { pair, state })
}

/// PT amount matching a deposit-token text, or `None` if the text is not a
/// usable amount.
fn token_to_pt(market: &Market, raw_input: &str) -> Result<Option<Amount>, QuoteError> {
    let sy = market.sy();
    let Some(amount) = Amount::try_parse(raw_input, sy.yield_token()) else {
        return Ok(None);
    };
    let sy_amount = sy.preview_deposit(&amount)?;
    let pt_amount = market.price_of(sy.token())?.quote(&sy_amount)?;
    Ok(Some(pt_amount))
}

/// Deposit-token amount matching a PT text, or `None` if the text is not a
/// usable amount.
fn pt_to_token(market: &Market, raw_input: &str) -> Result<Option<Amount>, QuoteError> {
    let Some(amount) = Amount::try_parse(raw_input, market.pt()) else {
        return Ok(None);
    };
    let sy = market.sy();
    let sy_amount = market.price_of(market.pt())?.quote(&amount)?;
    let token_amount = sy.preview_redeem(sy.yield_token(), &sy_amount)?;
    Ok(Some(token_amount))
}

/// Parses both fields: the deposit field against the SY's yield token and
/// the PT field against PT.
#[must_use]
pub fn parse_pair(market: &Market, pair: &InputPair) -> ParsedPair {
    ParsedPair {
        token: Amount::try_parse(&pair.token_input, market.sy().yield_token()),
        pt: Amount::try_parse(&pair.pt_input, market.pt()),
    }
}

/// Pool-share tokens the parsed pair would mint.
///
/// Zero when either amount is absent. Otherwise the deposit amount is
/// converted to SY at the current yield index and passed to the market's
/// liquidity formula together with the PT amount.
///
/// # Errors
///
/// Propagates any failure of the liquidity formula (see
/// [`Market::add_liquidity_preview`]).
pub fn lp_preview(
    market: &Market,
    token: Option<&Amount>,
    pt: Option<&Amount>,
) -> Result<Amount, QuoteError> {
    let (Some(token), Some(pt)) = (token, pt) else {
        return Ok(Amount::zero(market.lp_token().clone()));
    };
    let sy_amount = sy_equivalent(market, token)?;
    market.get_liquidity_minted(&sy_amount, pt)
}

/// SY equivalent of a deposit-token amount at the market's current yield
/// index.
///
/// # Errors
///
/// Returns [`QuoteError::TokenMismatch`] if `token` is not the SY's yield
/// token, or [`QuoteError::ArithmeticOverflow`].
pub fn sy_equivalent(market: &Market, token: &Amount) -> Result<Amount, QuoteError> {
    market.sy().yield_token().ensure_is(token.token())?;
    let raw = asset_to_sy(market.yt().py_index_current(), token.raw())
        .ok_or(QuoteError::ArithmeticOverflow)?;
    Ok(Amount::from_raw(market.sy().token().clone(), raw))
}

/// An input pair held between edits.
///
/// Thin stateful wrapper over [`derive_state`] for sessions that keep the
/// form open (one per market per WebSocket connection).
#[derive(Debug, Clone, Default)]
pub struct DualInput {
    pair: InputPair,
    state: Option<PairState>,
}

impl DualInput {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current field values.
    #[must_use]
    pub const fn pair(&self) -> &InputPair {
        &self.pair
    }

    /// State after the last edit; `Empty` before any edit.
    #[must_use]
    pub fn state(&self) -> PairState {
        self.state.unwrap_or(PairState::Empty)
    }

    /// Applies an edit to either field.
    ///
    /// # Errors
    ///
    /// See [`derive_state`]. The form is left unchanged on error.
    pub fn edit(
        &mut self,
        market: &Market,
        field: InputField,
        raw_input: &str,
    ) -> Result<PairState, QuoteError> {
        let derived = derive_state(market, &self.pair, field, raw_input)?;
        self.pair = derived.pair;
        self.state = Some(derived.state);
        Ok(derived.state)
    }

    /// Edits the deposit-token field.
    ///
    /// # Errors
    ///
    /// See [`derive_state`].
    pub fn edit_token(&mut self, market: &Market, raw_input: &str) -> Result<PairState, QuoteError> {
        self.edit(market, InputField::Token, raw_input)
    }

    /// Edits the PT field.
    ///
    /// # Errors
    ///
    /// See [`derive_state`].
    pub fn edit_pt(&mut self, market: &Market, raw_input: &str) -> Result<PairState, QuoteError> {
        self.edit(market, InputField::Pt, raw_input)
    }

    /// Clears both fields.
    pub fn reset(&mut self) {
        self.pair = InputPair::default();
        self.state = None;
    }

    /// Both fields parsed against `market`.
    #[must_use]
    pub fn parsed(&self, market: &Market) -> ParsedPair {
        parse_pair(market, &self.pair)
    }

    /// Pool-share preview for the current fields against `market`.
    ///
    /// # Errors
    ///
    /// See [`lp_preview`].
    pub fn lp_preview(&self, market: &Market) -> Result<Amount, QuoteError> {
        let parsed = self.parsed(market);
        lp_preview(market, parsed.token.as_ref(), parsed.pt.as_ref())
    }
}
