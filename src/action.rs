#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectPrevChart,
    SelectNextChart,
    ToggleDetail,
    TogglePause,
    None,
}
