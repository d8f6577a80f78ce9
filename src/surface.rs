/// Which screen the client shows. Derived, never assigned by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiSurface {
    Loading,
    ConnectPrompt,
    CharacterSelect,
    Arena,
}

impl UiSurface {
    /// Total mapping over the three inputs. Loading wins over everything.
    pub fn derive(loading: bool, has_account: bool, has_character: bool) -> Self {
        match (loading, has_account, has_character) {
            (true, _, _) => UiSurface::Loading,
            (false, false, _) => UiSurface::ConnectPrompt,
            (false, true, false) => UiSurface::CharacterSelect,
            (false, true, true) => UiSurface::Arena,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            UiSurface::Loading => "Loading",
            UiSurface::ConnectPrompt => "Connect Wallet",
            UiSurface::CharacterSelect => "Select Character",
            UiSurface::Arena => "Arena",
        }
    }
}
