//! The [`ksni::Tray`] implementation behind each tray icon.
//!
//! One [`SniItem`] is registered on the session bus per tray name.  The item
//! owns its presentation state; mutations go through the item's blocking
//! handle so ksni can emit the matching D-Bus change signals.

/// Presentation state of one StatusNotifierItem.
#[derive(Debug)]
pub struct SniItem {
    /// SNI id, also used as the title.  Set once at creation.
    name: String,
    /// Decoded icon image.  Kept across blink phases.
    pub(crate) pixmap: Vec<ksni::Icon>,
    /// When set, [`icon_pixmap`](ksni::Tray::icon_pixmap) reports nothing
    /// (the blank blink phase).
    pub(crate) icon_hidden: bool,
    /// Tooltip text.
    pub(crate) tooltip: String,
    /// Hidden items report [`ksni::Status::Passive`].
    pub(crate) visible: bool,
}

impl SniItem {
    /// A fresh item: visible, no image, no tooltip.
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pixmap: Vec::new(),
            icon_hidden: false,
            tooltip: String::new(),
            visible: true,
        }
    }
}

impl ksni::Tray for SniItem {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        if self.icon_hidden {
            Vec::new()
        } else {
            self.pixmap.clone()
        }
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: Vec::new(),
            title: self.tooltip.clone(),
            description: String::new(),
        }
    }

    fn status(&self) -> ksni::Status {
        if self.visible {
            ksni::Status::Active
        } else {
            ksni::Status::Passive
        }
    }
}
