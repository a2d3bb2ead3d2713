//! Sample logs shared by the unit tests.

pub const LOG_1: &str = r#"{"type":"SourceDescriptor","conversion_date":null,"filename":"test1a.csv","filesize":null,"sha256":null,"format":null,"currency":null,"columns":{"Datum":"date","Betrag":"value","Beschreibung":"details"},"num_lines":null,"num_trns":null}
{"type":"SetSummary","date_start":"1972-07-01","date_end":"1972-07-31","date_first":null,"date_last":null,"value_start":null,"value_end":null,"value_diff":null}
{"type":"Transaction","source_line":4,"columns":{"date":"1972-07-10","value":"+100.78","details":"Transfer 1a-1"},"notes":{"category":"transfers","category_auto":true,"remark":""}}
{"type":"Transaction","source_line":5,"columns":{"date":"1972-07-20","value":"+200.78","details":"Transfer 1a-2"},"notes":{"category":"","category_auto":null,"remark":"abc"}}
{"type":"Transaction","source_line":6,"columns":{"date":"1972-07-30","value":"+300.78","details":"Transfer 1a-3"},"notes":{"category":"","category_auto":null,"remark":""}}

{"type":"SourceDescriptor","conversion_date":null,"filename":"test1b.csv","filesize":null,"sha256":null,"format":null,"currency":null,"columns":{"Datum":"date","Betrag":"value","Beschreibung":"details","Konto":"account"},"num_lines":null,"num_trns":null}
{"type":"SetSummary","date_start":"1972-08-01","date_end":"1972-08-31","date_first":null,"date_last":null,"value_start":null,"value_end":null,"value_diff":null}
{"type":"Transaction","source_line":4,"columns":{"date":"1972-08-05","value":"+100.55","details":"Transfer 1b-1","account":"DE 99 1111 2222 3333 4444 55"},"notes":{"category":"","category_auto":null,"remark":""}}

"#;

pub const LOG_2: &str = r#"{"type":"SourceDescriptor","conversion_date":null,"filename":"test2.csv","filesize":null,"sha256":null,"format":null,"currency":null,"columns":{"Datum":"date","Betrag":"value","Beschreibung":"details"},"num_lines":null,"num_trns":null}
{"type":"SetSummary","date_start":"1973-01-01","date_end":"1973-01-31","date_first":null,"date_last":null,"value_start":null,"value_end":null,"value_diff":null}
{"type":"Transaction","source_line":4,"columns":{"date":"1973-01-11","value":"+11.00","details":"Transfer 2-11"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":5,"columns":{"date":"1973-01-12","value":"+11.00","details":"Transfer 2-12"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":6,"columns":{"date":"1973-01-13","value":"+11.00","details":"Transfer 2-13"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":7,"columns":{"date":"1973-01-14","value":"+11.00","details":"Transfer 2-14"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":8,"columns":{"date":"1973-01-15","value":"+11.00","details":"Transfer 2-15"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":9,"columns":{"date":"1973-01-16","value":"+11.00","details":"Transfer 2-16"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":10,"columns":{"date":"1973-01-17","value":"+11.00","details":"Transfer 2-17"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":11,"columns":{"date":"1973-01-18","value":"+11.00","details":"Transfer 2-18"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":12,"columns":{"date":"1973-01-19","value":"+11.00","details":"Transfer 2-19"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":13,"columns":{"date":"1973-01-20","value":"+11.00","details":"Transfer 2-20"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":14,"columns":{"date":"1973-01-21","value":"+11.00","details":"Transfer 2-21"},"notes":{"category":"","category_auto":null,"remark":""}}
{"type":"Transaction","source_line":15,"columns":{"date":"1973-01-22","value":"+11.00","details":"Transfer 2-22"},"notes":{"category":"","category_auto":null,"remark":""}}

"#;
