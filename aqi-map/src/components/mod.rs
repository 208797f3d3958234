pub mod aqi_display;
pub mod help_bar;
pub mod history_chart;
pub mod location_header;
pub mod map_view;
pub mod reading_panel;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use aqi_display::{AqiDisplay, AqiDisplayProps, ERROR_ICON, LOCATION_ICON, SPINNERS};
pub use help_bar::{HelpBar, HelpBarProps};
pub use history_chart::{HistoryChart, HistoryChartProps};
pub use location_header::{LocationHeader, LocationHeaderProps};
pub use map_view::{MapView, MapViewProps};
pub use reading_panel::{NO_DATA_TEXT, ReadingPanel, ReadingPanelProps};
