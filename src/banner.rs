// src/banner.rs

/// Prints the harness startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
                     _            _               _    
  __ _ _ __ __ _  __| | ___   ___| |__   ___  ___| | __
 / _` | '__/ _` |/ _` |/ _ \ / __| '_ \ / _ \/ __| |/ /
| (_| | | | (_| | (_| |  __/| (__| | | |  __/ (__|   < 
 \__, |_|  \__,_|\__,_|\___| \___|_| |_|\___|\___|_|\_\
 |___/                                                 

    Essay Grading API Conformance Harness
"#;
    println!("{}", banner);
}
