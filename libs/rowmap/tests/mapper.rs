use std::borrow::Cow;

use chrono::{TimeZone, Utc};
use rowmap::schema::FieldKind;
use rowmap::{CoercionError, MapError, Mapper, RawValue, Record, RecordShape, Timestamp};

#[derive(Record, Debug, Default, PartialEq)]
#[allow(non_snake_case)]
struct Customer {
    CustomerID: i64,
    name: String,
    region: String,
    visits: i32,
    created: Timestamp,
}

#[derive(Record, Debug, Default)]
struct Invoice {
    #[column(name = "inv_no")]
    number: i64,
    amount: i64,
    #[column(skip)]
    printed: bool,
    ratio: f64,
}

#[test]
fn subset_of_fields_maps_without_failures() {
    let created = Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap();

    let mut mapper = Mapper::new();
    mapper.configure_columns(["CUSTOMERID", "Name", "visits", "CREATED"]);

    let mut customer = Customer::default();
    let row = [
        RawValue::Numeric(Cow::Borrowed("1001")),
        RawValue::from("Ada"),
        RawValue::Int64(12),
        RawValue::from(created),
    ];
    let report = mapper.map_row(&row, &mut customer).unwrap();

    assert!(report.is_complete(), "{:?}", report.failures);
    assert_eq!(report.populated.len(), 4);
    assert_eq!(
        customer,
        Customer {
            CustomerID: 1001,
            name: "Ada".into(),
            region: String::new(),
            visits: 12,
            created: Timestamp {
                seconds: created.timestamp(),
                nanos: 0,
            },
        }
    );
}

#[test]
fn alias_routes_column_to_field() {
    let mut mapper = Mapper::new();
    mapper.set_alias("cust_id", "customerid");
    mapper.configure_columns(["cust_id"]);

    let mut customer = Customer::default();
    let report = mapper.map_row(&[RawValue::Int64(42)], &mut customer).unwrap();

    assert!(report.is_complete());
    assert_eq!(customer.CustomerID, 42);
}

#[test]
fn unsupported_source_kind_skips_only_that_field() {
    let mut mapper = Mapper::new();
    mapper.configure_columns(["name", "region", "visits"]);

    let mut customer = Customer::default();
    let row = [RawValue::from("Grace"), RawValue::Bool(true), RawValue::Int64(3)];
    let report = mapper.map_row(&row, &mut customer).unwrap();

    assert_eq!(customer.name, "Grace");
    assert_eq!(customer.visits, 3);
    assert_eq!(customer.region, "");

    assert_eq!(report.failures.len(), 1);
    let failure = report.failure("region").unwrap();
    assert_eq!(failure.field, Some("region"));
    assert_eq!(
        failure.error,
        MapError::Coercion(CoercionError::Incompatible {
            expected: FieldKind::Text,
            found: "bool",
        })
    );
}

#[test]
fn switching_target_types_rebuilds_each_time() {
    let mut mapper = Mapper::new();
    mapper.configure_columns(["amount"]);

    mapper.map_row(&[RawValue::Int64(1)], &mut Invoice::default()).unwrap();
    mapper.map_row(&[RawValue::Int64(1)], &mut Customer::default()).unwrap();
    mapper.map_row(&[RawValue::Int64(1)], &mut Invoice::default()).unwrap();

    assert_eq!(mapper.resolver().table_builds(), 3);
}

#[test]
fn configuring_same_type_twice_is_a_no_op() {
    let mut mapper = Mapper::new();
    mapper.configure::<Customer>().unwrap();
    mapper.configure::<Box<Customer>>().unwrap();
    assert_eq!(mapper.resolver().table_builds(), 1);
}

#[test]
fn tag_skip_and_unsupported_field_types() {
    let mut mapper = Mapper::new();
    mapper.configure_columns(["INV_NO", "printed", "ratio", "amount"]);

    let mut invoice = Invoice::default();
    let row = [
        RawValue::Int64(17),
        RawValue::Bool(true),
        RawValue::Float64(0.5),
        RawValue::Null,
    ];
    let report = mapper.map_row(&row, &mut invoice).unwrap();

    assert_eq!(invoice.number, 17);
    assert!(!invoice.printed);
    assert_eq!(invoice.ratio, 0.0);
    assert_eq!(invoice.amount, 0);

    assert_eq!(
        report.failure("printed").map(|f| &f.error),
        Some(&MapError::FieldNotMapped("printed".into()))
    );
    assert_eq!(
        report.failure("ratio").map(|f| &f.error),
        Some(&MapError::Coercion(CoercionError::UnsupportedKind("f64")))
    );
    assert_eq!(
        report.failure("amount").map(|f| &f.error),
        Some(&MapError::Coercion(CoercionError::NilValue))
    );
}

#[test]
fn boxed_target_is_mapped_through_the_reference() {
    let mut mapper = Mapper::new();
    mapper.configure_columns(["name"]);

    let mut customer = Box::new(Customer::default());
    let report = mapper.map_row(&[RawValue::from("Linus")], &mut customer).unwrap();

    assert!(report.is_complete());
    assert_eq!(customer.name, "Linus");
}

#[test]
fn derived_shape_lists_declared_fields() {
    let shape = Invoice::shape();
    let record = shape.record().unwrap();
    assert_eq!(record.name, "Invoice");

    let fields = (record.fields)();
    let names: Vec<_> = fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["number", "amount", "ratio"]);
    assert_eq!(fields[0].tag, Some("inv_no"));
    assert_eq!(fields[2].kind, FieldKind::Unsupported("f64"));
}

#[test]
fn vector_target_is_rejected() {
    let mut mapper = Mapper::new();
    let err = mapper.configure::<Vec<Customer>>().unwrap_err();
    assert!(matches!(err, MapError::InvalidTargetKind(_)));
}
