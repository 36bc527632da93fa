//! Field selection for payment reads
//!
//! A `Selection` mirrors the shape of `Payment` with one flag per field. The
//! identity is always returned and has no flag.

/// Fields of a payment to retrieve
///
/// `Selection::default()` retrieves the identity only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub version: bool,
    pub payment_type: bool,
    pub organisation_id: bool,
    pub attributes: SelectionAttributes,
}

/// Flags for the nested attributes of a payment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectionAttributes {
    pub amount: bool,
    pub currency: bool,
    pub reference: bool,
    pub end_to_end_reference: bool,
    pub numeric_reference: bool,
    pub payment_id: bool,
    pub payment_purpose: bool,
    pub payment_scheme: bool,
    pub payment_type: bool,
    pub processing_date: bool,
    pub scheme_payment_sub_type: bool,
    pub scheme_payment_type: bool,
    pub beneficiary_party: bool,
    pub debtor_party: bool,
    pub sponsor_party: bool,
    pub charges_information: bool,
    pub fx: bool,
}

const SELECT_ALL: Selection = Selection {
    version: true,
    payment_type: true,
    organisation_id: true,
    attributes: SelectionAttributes::ALL,
};

impl Selection {
    /// Selects the identity only
    pub const fn id_only() -> Self {
        Self {
            version: false,
            payment_type: false,
            organisation_id: false,
            attributes: SelectionAttributes::NONE,
        }
    }

    /// Selects every field
    pub const fn all() -> Self {
        SELECT_ALL
    }

    pub fn with_version(mut self) -> Self {
        self.version = true;
        self
    }

    pub fn with_type(mut self) -> Self {
        self.payment_type = true;
        self
    }

    pub fn with_organisation_id(mut self) -> Self {
        self.organisation_id = true;
        self
    }

    pub fn with_attributes(mut self, attributes: SelectionAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns true if any field stored in the blob is selected
    pub fn needs_blob(&self) -> bool {
        self.payment_type || self.attributes.any()
    }

    /// Returns true if every blob field is selected
    pub fn selects_whole_blob(&self) -> bool {
        self.payment_type && self.attributes.all_set()
    }

    /// Parses a comma separated list of field names.
    ///
    /// Accepts `version`, `type`, `organisation_id`, `attributes` (all nested
    /// attributes), `attributes.<name>` and `all`. Returns the first unknown
    /// name on failure.
    pub fn parse_fields(list: &str) -> Result<Self, String> {
        let mut selection = Selection::id_only();
        for raw in list.split(',') {
            let name = raw.trim();
            match name {
                "" | "id" => {}
                "all" => selection = Selection::all(),
                "version" => selection.version = true,
                "type" => selection.payment_type = true,
                "organisation_id" => selection.organisation_id = true,
                "attributes" => selection.attributes = SelectionAttributes::ALL,
                other => {
                    let attr = other
                        .strip_prefix("attributes.")
                        .ok_or_else(|| other.to_string())?;
                    if !selection.attributes.set_by_name(attr) {
                        return Err(other.to_string());
                    }
                }
            }
        }
        Ok(selection)
    }
}

impl SelectionAttributes {
    pub const NONE: SelectionAttributes = SelectionAttributes {
        amount: false,
        currency: false,
        reference: false,
        end_to_end_reference: false,
        numeric_reference: false,
        payment_id: false,
        payment_purpose: false,
        payment_scheme: false,
        payment_type: false,
        processing_date: false,
        scheme_payment_sub_type: false,
        scheme_payment_type: false,
        beneficiary_party: false,
        debtor_party: false,
        sponsor_party: false,
        charges_information: false,
        fx: false,
    };

    pub const ALL: SelectionAttributes = SelectionAttributes {
        amount: true,
        currency: true,
        reference: true,
        end_to_end_reference: true,
        numeric_reference: true,
        payment_id: true,
        payment_purpose: true,
        payment_scheme: true,
        payment_type: true,
        processing_date: true,
        scheme_payment_sub_type: true,
        scheme_payment_type: true,
        beneficiary_party: true,
        debtor_party: true,
        sponsor_party: true,
        charges_information: true,
        fx: true,
    };

    fn flags(&self) -> [bool; 17] {
        [
            self.amount,
            self.currency,
            self.reference,
            self.end_to_end_reference,
            self.numeric_reference,
            self.payment_id,
            self.payment_purpose,
            self.payment_scheme,
            self.payment_type,
            self.processing_date,
            self.scheme_payment_sub_type,
            self.scheme_payment_type,
            self.beneficiary_party,
            self.debtor_party,
            self.sponsor_party,
            self.charges_information,
            self.fx,
        ]
    }

    /// Returns true if at least one attribute is selected
    pub fn any(&self) -> bool {
        self.flags().iter().any(|f| *f)
    }

    /// Returns true if every attribute is selected
    pub fn all_set(&self) -> bool {
        self.flags().iter().all(|f| *f)
    }

    fn set_by_name(&mut self, name: &str) -> bool {
        let flag = match name {
            "amount" => &mut self.amount,
            "currency" => &mut self.currency,
            "reference" => &mut self.reference,
            "end_to_end_reference" => &mut self.end_to_end_reference,
            "numeric_reference" => &mut self.numeric_reference,
            "payment_id" => &mut self.payment_id,
            "payment_purpose" => &mut self.payment_purpose,
            "payment_scheme" => &mut self.payment_scheme,
            "payment_type" => &mut self.payment_type,
            "processing_date" => &mut self.processing_date,
            "scheme_payment_sub_type" => &mut self.scheme_payment_sub_type,
            "scheme_payment_type" => &mut self.scheme_payment_type,
            "beneficiary_party" => &mut self.beneficiary_party,
            "debtor_party" => &mut self.debtor_party,
            "sponsor_party" => &mut self.sponsor_party,
            "charges_information" => &mut self.charges_information,
            "fx" => &mut self.fx,
            _ => return false,
        };
        *flag = true;
        true
    }
}
