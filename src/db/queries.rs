// CQL statements; tables live in the session keyspace.

// patients
pub const INSERT_PATIENT: &str = r#"
    INSERT INTO patients (
        patient_id, full_name, document_id, birth_date, email, phone, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_PATIENT: &str = r#"
    SELECT patient_id, full_name, document_id, birth_date, email, phone, created_at
    FROM patients
    WHERE patient_id = ?
"#;

pub const SELECT_PATIENTS_BY_IDS: &str = r#"
    SELECT patient_id, full_name, document_id, birth_date, email, phone, created_at
    FROM patients
    WHERE patient_id IN ?
"#;

pub const SELECT_ALL_PATIENTS: &str = r#"
    SELECT patient_id, full_name, document_id, birth_date, email, phone, created_at
    FROM patients
"#;

pub const UPDATE_PATIENT: &str = r#"
    UPDATE patients
    SET full_name = ?, birth_date = ?, email = ?, phone = ?
    WHERE patient_id = ?
    IF EXISTS
"#;

pub const DELETE_PATIENT: &str = r#"
    DELETE FROM patients WHERE patient_id = ? IF EXISTS
"#;

// invoices
pub const INSERT_INVOICE: &str = r#"
    INSERT INTO invoices (
        invoice_id, patient_id, number, amount, issued_at, paid, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_INVOICE: &str = r#"
    SELECT invoice_id, patient_id, number, amount, issued_at, paid, created_at
    FROM invoices
    WHERE invoice_id = ?
"#;

pub const SELECT_ALL_INVOICES: &str = r#"
    SELECT invoice_id, patient_id, number, amount, issued_at, paid, created_at
    FROM invoices
"#;

pub const SELECT_INVOICES_BY_PATIENT: &str = r#"
    SELECT invoice_id, patient_id, number, amount, issued_at, paid, created_at
    FROM invoices
    WHERE patient_id = ?
"#;

// Both are conditional on the number the caller read, so a row deleted or
// renumbered in between is never resurrected or silently overwritten.
pub const UPDATE_INVOICE: &str = r#"
    UPDATE invoices
    SET number = ?, amount = ?, issued_at = ?, paid = ?
    WHERE invoice_id = ?
    IF number = ?
"#;

pub const DELETE_INVOICE: &str = r#"
    DELETE FROM invoices WHERE invoice_id = ? IF number = ?
"#;

// invoice_numbers: every write is a lightweight transaction
pub const CLAIM_INVOICE_NUMBER: &str = r#"
    INSERT INTO invoice_numbers (number, invoice_id)
    VALUES (?, ?)
    IF NOT EXISTS
"#;

pub const RELEASE_INVOICE_NUMBER: &str = r#"
    DELETE FROM invoice_numbers
    WHERE number = ?
    IF invoice_id = ?
"#;

// users
pub const INSERT_USER_IF_ABSENT: &str = r#"
    INSERT INTO users (username, user_id, email, password_hash, roles)
    VALUES (?, ?, ?, ?, ?)
    IF NOT EXISTS
"#;

pub const SELECT_USER_BY_USERNAME: &str = r#"
    SELECT username, user_id, email, password_hash, roles
    FROM users
    WHERE username = ?
"#;
