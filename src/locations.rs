use url::Url;

const MAP_SEARCH: &str = "https://www.google.com/maps/search/";
const CAMPUS_SUFFIX: &str = "Sri Venkateswara University, Tirupati, Andhra Pradesh";

pub const LOCATIONS: &[&str] = &[
    "Sri Venkateswara University, Tirupati",
    "Computer Centre",
    "Department of Adult & Continuing Education",
    "Department of Ancient Indian History, Culture & Archaeology",
    "Department of Biochemistry",
    "Department of Biotechnology",
    "Department of Botany",
    "Department of Chemical Engineering",
    "Department of Chemistry",
    "Department of Civil Engineering",
    "Department of Commerce",
    "Department of Computer Science",
    "Department of Data Science",
    "Department of Econometrics",
    "Department of Economics",
    "Department of Education",
    "Department of Electrical & Electronics Engineering (EEE)",
    "Department of Electronics",
    "Department of Electronics & Communication Engineering (ECE)",
    "Department of English",
    "Department of Foreign Languages & Linguistics",
    "Department of Geography",
    "Department of Geology",
    "Department of Hindi",
    "Department of History",
    "Department of Home Science",
    "Department of Industrial Fisheries",
    "Department of Journalism and Mass Communication",
    "Department of Law",
    "Department of Management Studies (MBA)",
    "Department of Mathematics",
    "Department of Mechanical Engineering",
    "Department of Microbiology",
    "Department of Performing Arts",
    "Department of Philosophy",
    "Department of Physical Education",
    "Department of Physics",
    "Department of Political Science & Public Administration",
    "Department of Population Studies & Social Work",
    "Department of Psychology",
    "Department of Sanskrit",
    "Department of Sociology",
    "Department of Statistics",
    "Department of Tamil",
    "Department of Telugu Studies",
    "Department of Urdu",
    "Department of Virology",
    "Department of Zoology",
    "Directorate of Distance Education (DDE)",
    "Health Center",
    "Hostels",
    "Internal Quality Assurance Cell (IQAC)",
    "Srinivasa Auditorium",
    "SVU Central Library",
    "SVU College of Arts",
    "SVU College of Commerce, Management & Computer Science",
    "SVU College of Engineering",
    "SVU College of Pharmaceutical Sciences",
    "SVU College of Sciences",
    "SVU Oriental Research Institute",
    "Tarakarama Stadium",
    "University Scientific Instrumentation Centre (USIC)",
];

/// Map search for a campus place, scoped to the university.
pub fn map_search_url(name: &str) -> Result<Url, url::ParseError> {
    let query = format!("{}, {}", name, CAMPUS_SUFFIX);
    Url::parse_with_params(MAP_SEARCH, &[("api", "1"), ("query", query.as_str())])
}
