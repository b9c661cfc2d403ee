//! Static chart and dataset catalogs shown on the dashboard.

use serde::Serialize;

pub const HERO_TITLE: &str = "Criminal Database Portal";

pub const DEFAULT_TAB: &str = "2023";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartOption {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub title: &'static str,
    pub description: &'static str,
    pub size: &'static str,
    pub format: &'static str,
    pub source: &'static str,
}

pub const CHART_OPTIONS: &[ChartOption] = &[
    ChartOption {
        id: "state",
        title: "Crime by State",
        description: "Bar chart comparing crime statistics across different states",
        icon: "📊",
    },
    ChartOption {
        id: "trend",
        title: "Year-wise Crime Trends",
        description: "Line chart analyzing crime patterns over multiple years",
        icon: "📈",
    },
    ChartOption {
        id: "category",
        title: "Crime Categories",
        description: "Pie chart showing distribution of different crime types",
        icon: "🥧",
    },
    ChartOption {
        id: "stacked",
        title: "Stacked Bar Chart",
        description: "Multi-category crime comparison across states",
        icon: "📊",
    },
    ChartOption {
        id: "scatter",
        title: "Crime vs Population",
        description: "Scatter plot analyzing relationship between population and crime",
        icon: "📉",
    },
    ChartOption {
        id: "timeseries",
        title: "Time Series Comparison",
        description: "Year-over-year monthly comparison of crime trends",
        icon: "📅",
    },
    ChartOption {
        id: "heatmap",
        title: "District Crime Heatmap",
        description: "Monthly crime intensity across major urban districts",
        icon: "🔥",
    },
    ChartOption {
        id: "map",
        title: "India Choropleth Map",
        description: "Interactive heat map showing crime distribution across Indian states",
        icon: "🗺️",
    },
];

const NCRB: &str = "National Crime Records Bureau";
const OGD: &str = "Open Government Data Platform";
const MHA: &str = "Ministry of Home Affairs";
const KAGGLE: &str = "Kaggle Public Datasets";

const DATASETS_2023: &[Dataset] = &[
    Dataset {
        title: "Complete Crime Dataset 2023",
        description: "Comprehensive crime statistics across all Indian states for 2023",
        size: "2.4 MB",
        format: "CSV",
        source: NCRB,
    },
    Dataset {
        title: "State-wise Crime Data 2023",
        description: "Detailed breakdown of crimes by state and category",
        size: "1.8 MB",
        format: "JSON",
        source: OGD,
    },
    Dataset {
        title: "Crime Categories Analysis 2023",
        description: "Classification and distribution of crime types",
        size: "1.2 MB",
        format: "XLSX",
        source: MHA,
    },
];

const DATASETS_2022: &[Dataset] = &[
    Dataset {
        title: "Complete Crime Dataset 2022",
        description: "Comprehensive crime statistics across all Indian states for 2022",
        size: "2.3 MB",
        format: "CSV",
        source: NCRB,
    },
    Dataset {
        title: "State-wise Crime Data 2022",
        description: "Detailed breakdown of crimes by state and category",
        size: "1.7 MB",
        format: "JSON",
        source: OGD,
    },
    Dataset {
        title: "Crime Categories Analysis 2022",
        description: "Classification and distribution of crime types",
        size: "1.1 MB",
        format: "XLSX",
        source: MHA,
    },
    Dataset {
        title: "Monthly Crime Trends 2022",
        description: "Month-by-month breakdown of crime statistics",
        size: "890 KB",
        format: "CSV",
        source: KAGGLE,
    },
];

const DATASETS_2021: &[Dataset] = &[
    Dataset {
        title: "Complete Crime Dataset 2021",
        description: "Comprehensive crime statistics across all Indian states for 2021",
        size: "2.2 MB",
        format: "CSV",
        source: NCRB,
    },
    Dataset {
        title: "State-wise Crime Data 2021",
        description: "Detailed breakdown of crimes by state and category",
        size: "1.6 MB",
        format: "JSON",
        source: OGD,
    },
    Dataset {
        title: "Crime Categories Analysis 2021",
        description: "Classification and distribution of crime types",
        size: "1.0 MB",
        format: "XLSX",
        source: MHA,
    },
    Dataset {
        title: "District-wise Crime Data 2021",
        description: "Granular district-level crime statistics",
        size: "3.5 MB",
        format: "CSV",
        source: OGD,
    },
];

const DATASETS_HISTORICAL: &[Dataset] = &[
    Dataset {
        title: "Year-wise Trends (2015-2023)",
        description: "Historical crime data showing patterns over 8 years",
        size: "3.2 MB",
        format: "CSV",
        source: KAGGLE,
    },
    Dataset {
        title: "Decade Analysis (2010-2020)",
        description: "Long-term crime trends and statistical analysis",
        size: "4.8 MB",
        format: "CSV",
        source: NCRB,
    },
    Dataset {
        title: "All States Historical Data",
        description: "Complete historical dataset for all states (2015-2023)",
        size: "6.2 MB",
        format: "JSON",
        source: OGD,
    },
];

/// Tab keys in display order.
pub const DATASET_YEARS: [&str; 4] = ["2023", "2022", "2021", "historical"];

pub fn find_chart(id: &str) -> Option<&'static ChartOption> {
    CHART_OPTIONS.iter().find(|c| c.id == id)
}

/// Datasets for a tab key; unknown keys yield an empty slice.
pub fn datasets_for(year: &str) -> &'static [Dataset] {
    match year {
        "2023" => DATASETS_2023,
        "2022" => DATASETS_2022,
        "2021" => DATASETS_2021,
        "historical" => DATASETS_HISTORICAL,
        _ => &[],
    }
}
