// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use kernel::utilities::registers::register_bitfields;

register_bitfields![usize,
    pub mstatus [
        mie OFFSET(3) NUMBITS(1) [],
        mpie OFFSET(7) NUMBITS(1) [],
        mpp OFFSET(11) NUMBITS(2) [
            User = 0,
            Supervisor = 1,
            Machine = 3
        ]
    ]
];
