//! Input validation and sanitization for everything users type or upload.

use crate::domain::asset::{CryptoAsset, GiftCardBrand};
use crate::domain::message::Upload;
use crate::error::{BotError, Result};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::LazyLock;

pub const MAX_AMOUNT: Decimal = dec!(1_000_000);
pub const MAX_TEXT_LEN: usize = 1000;
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
];

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parses a user-entered amount, accepting only values in (0, 1_000_000].
pub fn parse_amount(text: &str) -> Result<Decimal> {
    match parse_decimal(text) {
        Some(amount) if amount > Decimal::ZERO && amount <= MAX_AMOUNT => Ok(amount),
        _ => Err(BotError::Validation(
            "Please enter a valid positive number for the amount (max 1,000,000).".to_string(),
        )),
    }
}

pub fn validate_amount(text: &str) -> bool {
    parse_amount(text).is_ok()
}

pub fn validate_crypto_type(text: &str) -> bool {
    text.parse::<CryptoAsset>().is_ok()
}

pub fn validate_gift_card_type(text: &str) -> bool {
    text.parse::<GiftCardBrand>().is_ok()
}

/// Strips `<...>` markup and truncates to [`MAX_TEXT_LEN`] characters.
pub fn sanitize_text(text: &str) -> String {
    MARKUP
        .replace_all(text, "")
        .chars()
        .take(MAX_TEXT_LEN)
        .collect()
}

/// Photos are accepted up to the size ceiling; documents must also carry an allowed
/// content type when the transport reports one.
pub fn validate_upload(upload: &Upload) -> bool {
    if upload.size() > MAX_UPLOAD_BYTES {
        return false;
    }
    match upload {
        Upload::Photo { .. } => true,
        Upload::Document { mime_type, .. } => mime_type
            .as_deref()
            .is_none_or(|mime| ALLOWED_DOCUMENT_TYPES.contains(&mime)),
    }
}

/// Parses gift card details such as `"50 USD"`: the first decimal number is the face
/// value, the rest of the text (upper-cased) is the country or currency.
pub fn parse_gift_details(text: &str) -> Result<(Decimal, String)> {
    let text = text.trim();
    let Some(number) = LEADING_NUMBER.find(text) else {
        return Err(BotError::Validation(
            "Please enter a valid amount (e.g., \"50 USD\", \"100 EUR\", \"25.50 CAD\").".to_string(),
        ));
    };
    let value = parse_amount(number.as_str()).map_err(|_| {
        BotError::Validation("Please enter a valid amount (max $1,000,000).".to_string())
    })?;

    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..number.start()]);
    rest.push_str(&text[number.end()..]);
    let country = sanitize_text(rest.trim()).trim().to_uppercase();
    if country.is_empty() {
        return Err(BotError::Validation(
            "Please specify the currency/country (e.g., \"50 USD\", \"100 EUR\").".to_string(),
        ));
    }
    Ok((value.normalize(), country))
}

/// A positive price, as entered in the crypto rate wizard.
pub fn parse_rate(text: &str) -> Result<Decimal> {
    match parse_decimal(text) {
        Some(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(BotError::Validation(
            "Please enter a valid positive number.".to_string(),
        )),
    }
}

/// A payout ratio in (0, 1], as entered in the gift card rate wizard.
pub fn parse_ratio(text: &str) -> Result<Decimal> {
    match parse_decimal(text) {
        Some(ratio) if ratio > Decimal::ZERO && ratio <= Decimal::ONE => Ok(ratio),
        _ => Err(BotError::Validation(
            "Please enter a valid rate between 0 and 1 (e.g., 0.85).".to_string(),
        )),
    }
}

pub fn parse_wallet_address(text: &str) -> Result<String> {
    let address = sanitize_text(text.trim());
    if address.is_empty() {
        return Err(BotError::Validation(
            "Please enter a valid wallet address.".to_string(),
        ));
    }
    Ok(address)
}
