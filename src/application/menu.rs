//! Button actions and the keyboards that carry them.

use crate::domain::asset::{CryptoAsset, GiftCardBrand};
use crate::domain::message::{Button, Keyboard};
use crate::domain::transaction::TransactionId;
use std::fmt;
use std::str::FromStr;

/// Every action a button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    MainMenu,
    BuyMenu,
    SellMenu,
    GiftCardMenu,
    History { page: usize },
    Help,
    AdminPanel,
    Buy(CryptoAsset),
    Sell(CryptoAsset),
    SellGiftCard(GiftCardBrand),
    SetCryptoRates,
    SetGiftCardRates,
    UpdateWallets,
    Approve(TransactionId),
    Reject(TransactionId),
}

impl MenuAction {
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Self::AdminPanel
                | Self::SetCryptoRates
                | Self::SetGiftCardRates
                | Self::UpdateWallets
                | Self::Approve(_)
                | Self::Reject(_)
        )
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainMenu => f.write_str("main_menu"),
            Self::BuyMenu => f.write_str("buy_crypto"),
            Self::SellMenu => f.write_str("sell_crypto"),
            Self::GiftCardMenu => f.write_str("sell_gift_cards"),
            Self::History { page: 1 } => f.write_str("transaction_history"),
            Self::History { page } => write!(f, "history_page_{page}"),
            Self::Help => f.write_str("help"),
            Self::AdminPanel => f.write_str("admin_panel"),
            Self::Buy(asset) => write!(f, "buy_{}", asset.code().to_lowercase()),
            Self::Sell(asset) => write!(f, "sell_{}", asset.code().to_lowercase()),
            Self::SellGiftCard(brand) => write!(f, "sell_{}", brand.slug()),
            Self::SetCryptoRates => f.write_str("set_crypto_rates"),
            Self::SetGiftCardRates => f.write_str("set_gift_card_rates"),
            Self::UpdateWallets => f.write_str("update_wallets"),
            Self::Approve(id) => write!(f, "approve_{id}"),
            Self::Reject(id) => write!(f, "reject_{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for MenuAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(s.to_string());
        let action = match s {
            "main_menu" => Self::MainMenu,
            "buy_crypto" => Self::BuyMenu,
            "sell_crypto" => Self::SellMenu,
            "sell_gift_cards" => Self::GiftCardMenu,
            "transaction_history" => Self::History { page: 1 },
            "help" => Self::Help,
            "admin_panel" => Self::AdminPanel,
            "set_crypto_rates" => Self::SetCryptoRates,
            "set_gift_card_rates" => Self::SetGiftCardRates,
            "update_wallets" => Self::UpdateWallets,
            _ => {
                if let Some(page) = s.strip_prefix("history_page_") {
                    match page.parse::<usize>() {
                        Ok(page) if page > 0 => Self::History { page },
                        _ => return Err(unknown()),
                    }
                } else if let Some(id) = s.strip_prefix("approve_") {
                    Self::Approve(id.parse().map_err(|_| unknown())?)
                } else if let Some(id) = s.strip_prefix("reject_") {
                    Self::Reject(id.parse().map_err(|_| unknown())?)
                } else if let Some(code) = s.strip_prefix("buy_") {
                    Self::Buy(code.to_uppercase().parse().map_err(|_| unknown())?)
                } else if let Some(target) = s.strip_prefix("sell_") {
                    match GiftCardBrand::from_slug(target) {
                        Some(brand) => Self::SellGiftCard(brand),
                        None => Self::Sell(target.to_uppercase().parse().map_err(|_| unknown())?),
                    }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(action)
    }
}

fn back_row() -> Vec<Button> {
    vec![Button::new("Back to Main Menu", MenuAction::MainMenu)]
}

pub fn main_menu(is_admin: bool) -> Keyboard {
    let mut rows = vec![
        vec![Button::new("Buy Crypto", MenuAction::BuyMenu)],
        vec![Button::new("Sell Crypto", MenuAction::SellMenu)],
        vec![Button::new("Sell Gift Cards", MenuAction::GiftCardMenu)],
        vec![Button::new(
            "Transaction History",
            MenuAction::History { page: 1 },
        )],
    ];
    if is_admin {
        rows.push(vec![Button::new("Admin Panel", MenuAction::AdminPanel)]);
    }
    rows.push(vec![Button::new("Help", MenuAction::Help)]);
    rows
}

pub fn asset_picker(action: fn(CryptoAsset) -> MenuAction) -> Keyboard {
    let mut rows: Keyboard = CryptoAsset::ALL
        .into_iter()
        .map(|asset| {
            vec![Button::new(
                format!("{} ({})", asset.name(), asset.code()),
                action(asset),
            )]
        })
        .collect();
    rows.push(back_row());
    rows
}

pub fn gift_card_picker() -> Keyboard {
    let mut rows: Keyboard = GiftCardBrand::ALL
        .into_iter()
        .map(|brand| {
            vec![Button::new(
                format!("{brand} Gift Card"),
                MenuAction::SellGiftCard(brand),
            )]
        })
        .collect();
    rows.push(back_row());
    rows
}

pub fn admin_panel() -> Keyboard {
    vec![
        vec![Button::new("Set Crypto Rates", MenuAction::SetCryptoRates)],
        vec![Button::new("Set Gift Card Rates", MenuAction::SetGiftCardRates)],
        vec![Button::new("Update Wallet Addresses", MenuAction::UpdateWallets)],
        back_row(),
    ]
}

pub fn back_to_menu() -> Keyboard {
    vec![back_row()]
}

pub fn review_controls(id: TransactionId) -> Keyboard {
    vec![
        vec![Button::new("✅ Approve", MenuAction::Approve(id))],
        vec![Button::new("❌ Reject", MenuAction::Reject(id))],
    ]
}

/// Previous/Next controls bounded by `total_pages`, followed by the way back.
pub fn history_navigation(page: usize, total_pages: usize) -> Keyboard {
    let mut nav = Vec::new();
    if page > 1 {
        nav.push(Button::new(
            "⬅️ Previous",
            MenuAction::History { page: page - 1 },
        ));
    }
    if page < total_pages {
        nav.push(Button::new("Next ➡️", MenuAction::History { page: page + 1 }));
    }

    let mut rows = Vec::new();
    if !nav.is_empty() {
        rows.push(nav);
    }
    rows.push(back_row());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_round_trips() {
        let id = TransactionId::new();
        let actions = [
            MenuAction::MainMenu,
            MenuAction::BuyMenu,
            MenuAction::SellMenu,
            MenuAction::GiftCardMenu,
            MenuAction::History { page: 1 },
            MenuAction::History { page: 3 },
            MenuAction::Help,
            MenuAction::AdminPanel,
            MenuAction::Buy(CryptoAsset::Usdt),
            MenuAction::Sell(CryptoAsset::Btc),
            MenuAction::SellGiftCard(GiftCardBrand::GooglePlay),
            MenuAction::SetCryptoRates,
            MenuAction::SetGiftCardRates,
            MenuAction::UpdateWallets,
            MenuAction::Approve(id),
            MenuAction::Reject(id),
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<MenuAction>(), Ok(action));
        }
    }

    #[test]
    fn test_unknown_actions() {
        assert!("buy_doge".parse::<MenuAction>().is_err());
        assert!("approve_42".parse::<MenuAction>().is_err());
        assert!("history_page_0".parse::<MenuAction>().is_err());
        assert!("launch_rocket".parse::<MenuAction>().is_err());
    }

    #[test]
    fn test_admin_button_only_for_admins() {
        let admin = main_menu(true);
        let user = main_menu(false);
        assert_eq!(admin.len(), user.len() + 1);
        assert!(
            admin
                .iter()
                .flatten()
                .any(|b| b.action == MenuAction::AdminPanel.to_string())
        );
    }

    #[test]
    fn test_history_navigation_is_bounded() {
        let first = history_navigation(1, 3);
        assert_eq!(first[0].len(), 1);
        assert_eq!(first[0][0].action, "history_page_2");

        let last = history_navigation(3, 3);
        assert_eq!(last[0][0].action, "history_page_2");

        let only = history_navigation(1, 1);
        assert_eq!(only.len(), 1);
    }
}
